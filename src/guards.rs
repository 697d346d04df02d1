//! Validation guards applied to custom pageview properties before they are
//! forwarded to the Plausible collection endpoint.
//!
//! All three guards are pure predicates: the only effect is diagnostic output
//! through the supplied [`Logger`]. They never panic and never return errors;
//! a `false` return means the caller should not forward the value.
//! See <https://plausible.io/docs/custom-props/introduction#accepted-values>.

use crate::logger::Logger;
use crate::props::{PageviewProps, PropEntry};

/// Maximum number of custom properties per event.
/// See <https://plausible.io/docs/custom-props/introduction#limits>.
pub const CUSTOM_PROPS_LIMIT: usize = 30;

/// Maximum character length of a property name.
pub const PROP_NAME_CHAR_LIMIT: usize = 300;

/// Maximum character length of a property value.
pub const PROP_VALUE_CHAR_LIMIT: usize = 2000;

/// Classifies a candidate entry and reports whether it is acceptable.
///
/// DOMTokenList, HTMLInputElement, Array, RegExp, and Date shapes stringify,
/// but usually not to what the caller intended, so they are let through with
/// a warning; booleans, numbers, and strings pass silently. Anything else is
/// rejected: this emits an error-level diagnostic naming the value and
/// returns `false`.
pub fn handle_entry(logger: &Logger, entry: &PropEntry) -> bool {
    match entry {
        PropEntry::TokenList(_)
        | PropEntry::FormInput(_)
        | PropEntry::Array(_)
        | PropEntry::Regex(_)
        | PropEntry::Date(_) => {
            logger.warn(format!(
                "Passing {} to Plausible may result in error unless parsed as a string.",
                entry.type_name()
            ));
            true
        }

        PropEntry::Bool(_) | PropEntry::Number(_) | PropEntry::String(_) => true,

        PropEntry::Unsupported { rendered, .. } => {
            logger.error(format!(
                "Custom property entry {rendered} is not a boolean, number, or string."
            ));
            false
        }
    }
}

/// Checks that a props mapping stays within the per-event entry limit.
///
/// A wholesale flag carries no entries, so the count check does not apply.
pub fn is_custom_props_limit(props: &PageviewProps) -> bool {
    match props {
        PageviewProps::Flag(_) => true,
        PageviewProps::Props(map) => map.len() <= CUSTOM_PROPS_LIMIT,
    }
}

/// Checks that an entry's string representation stays within `limit`
/// characters. Used for both property names (limit 300) and values
/// (limit 2000); the limit is a parameter, not baked in.
pub fn is_custom_prop_entry_limit(logger: &Logger, limit: usize, entry: &PropEntry) -> bool {
    let as_string = entry.render();

    // No limit checks needed for boolean
    if matches!(entry, PropEntry::Bool(_)) {
        return true;
    }

    if matches!(entry, PropEntry::Number(_)) && as_string.chars().count() > limit {
        return false;
    }

    if !handle_entry(logger, entry) {
        return false;
    }

    // Re-checked unconditionally: sole check for strings, intentional
    // redundancy for numbers.
    if as_string.chars().count() > limit {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLevel;
    use crate::props::PageviewProp;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    fn capturing_logger() -> (Logger, Arc<Mutex<Vec<(LogLevel, String)>>>) {
        let logger = Logger::new("@plausible/guards-test");
        let records = Arc::new(Mutex::new(Vec::new()));
        let handler_records = Arc::clone(&records);
        logger.set_log_handler(move |_, level, message| {
            handler_records
                .lock()
                .unwrap()
                .push((level, message.to_owned()));
        });
        (logger, records)
    }

    fn unsupported() -> PropEntry {
        PropEntry::Unsupported {
            type_name: "Object".into(),
            rendered: "[object Object]".into(),
        }
    }

    #[test]
    fn accepted_kinds_pass_without_diagnostics() {
        let (logger, records) = capturing_logger();
        assert!(handle_entry(&logger, &PropEntry::Bool(true)));
        assert!(handle_entry(&logger, &PropEntry::Number(12.0)));
        assert!(handle_entry(&logger, &PropEntry::String("plan".into())));
        assert!(records.lock().unwrap().is_empty());
    }

    #[test]
    fn risky_kinds_pass_with_one_warning_each() {
        let risky = [
            PropEntry::TokenList(vec!["nav".into()]),
            PropEntry::FormInput("x".into()),
            PropEntry::Array(vec![PageviewProp::from(1)]),
            PropEntry::Regex("a+".into()),
            PropEntry::Date(Utc::now()),
        ];
        for entry in &risky {
            let (logger, records) = capturing_logger();
            assert!(handle_entry(&logger, entry));
            let stored = records.lock().unwrap();
            assert_eq!(stored.len(), 1, "expected one diagnostic for {entry:?}");
            assert_eq!(stored[0].0, LogLevel::Warn);
            assert!(stored[0].1.contains(entry.type_name()));
            assert!(stored[0]
                .1
                .ends_with("may result in error unless parsed as a string."));
        }
    }

    #[test]
    fn unsupported_kind_is_rejected_with_one_error() {
        let (logger, records) = capturing_logger();
        assert!(!handle_entry(&logger, &unsupported()));
        let stored = records.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, LogLevel::Error);
        assert_eq!(
            stored[0].1,
            "Custom property entry [object Object] is not a boolean, number, or string."
        );
    }

    #[test]
    fn handle_entry_is_idempotent() {
        let (logger, _records) = capturing_logger();
        let entry = unsupported();
        assert_eq!(
            handle_entry(&logger, &entry),
            handle_entry(&logger, &entry)
        );
        let entry = PropEntry::Regex("a".into());
        assert_eq!(
            handle_entry(&logger, &entry),
            handle_entry(&logger, &entry)
        );
    }

    #[test]
    fn props_flag_always_within_limit() {
        assert!(is_custom_props_limit(&PageviewProps::Flag(false)));
        assert!(is_custom_props_limit(&PageviewProps::Flag(true)));
    }

    #[test]
    fn props_count_boundary() {
        let at_limit: PageviewProps = (0..30u64).map(|i| (i, i as i64)).collect();
        assert!(is_custom_props_limit(&at_limit));

        let over_limit: PageviewProps = (0..31u64).map(|i| (i, i as i64)).collect();
        assert!(!is_custom_props_limit(&over_limit));
    }

    #[test]
    fn string_length_boundary() {
        let (logger, _) = capturing_logger();
        let exact = PropEntry::String("a".repeat(300));
        assert!(is_custom_prop_entry_limit(&logger, 300, &exact));
        let over = PropEntry::String("a".repeat(301));
        assert!(!is_custom_prop_entry_limit(&logger, 300, &over));
    }

    #[test]
    fn boolean_short_circuits_any_limit() {
        let (logger, records) = capturing_logger();
        assert!(is_custom_prop_entry_limit(&logger, 0, &PropEntry::Bool(true)));
        assert!(is_custom_prop_entry_limit(&logger, 0, &PropEntry::Bool(false)));
        assert!(records.lock().unwrap().is_empty());
    }

    #[test]
    fn numeric_string_representation_is_measured() {
        let (logger, _) = capturing_logger();
        // "123456" is six characters
        assert!(!is_custom_prop_entry_limit(
            &logger,
            5,
            &PropEntry::Number(123456.0)
        ));
        assert!(is_custom_prop_entry_limit(
            &logger,
            6,
            &PropEntry::Number(123456.0)
        ));
    }

    #[test]
    fn unsupported_entry_fails_length_guard_via_delegation() {
        let (logger, records) = capturing_logger();
        assert!(!is_custom_prop_entry_limit(&logger, 2000, &unsupported()));
        let stored = records.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, LogLevel::Error);
    }

    #[test]
    fn risky_entry_within_limit_passes_with_warning() {
        let (logger, records) = capturing_logger();
        let entry = PropEntry::TokenList(vec!["btn".into(), "primary".into()]);
        assert!(is_custom_prop_entry_limit(&logger, 2000, &entry));
        assert_eq!(records.lock().unwrap().len(), 1);
    }

    #[test]
    fn multibyte_strings_are_measured_in_characters() {
        let (logger, _) = capturing_logger();
        let entry = PropEntry::String("é".repeat(300));
        assert!(is_custom_prop_entry_limit(&logger, 300, &entry));
    }
}
