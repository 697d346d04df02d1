use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// A value accepted by Plausible as a custom-property value.
///
/// The collection endpoint accepts booleans, numbers, and strings; everything
/// else must be stringified by the caller before it is attached to an event.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageviewProp {
    Bool(bool),
    Number(f64),
    String(String),
}

impl PageviewProp {
    /// String coercion matching what the tracker script would send.
    pub fn render(&self) -> String {
        match self {
            PageviewProp::Bool(flag) => flag.to_string(),
            PageviewProp::Number(number) => number.to_string(),
            PageviewProp::String(text) => text.clone(),
        }
    }
}

impl From<bool> for PageviewProp {
    fn from(value: bool) -> Self {
        PageviewProp::Bool(value)
    }
}

impl From<f64> for PageviewProp {
    fn from(value: f64) -> Self {
        PageviewProp::Number(value)
    }
}

impl From<i64> for PageviewProp {
    fn from(value: i64) -> Self {
        PageviewProp::Number(value as f64)
    }
}

impl From<i32> for PageviewProp {
    fn from(value: i32) -> Self {
        PageviewProp::Number(value.into())
    }
}

impl From<u32> for PageviewProp {
    fn from(value: u32) -> Self {
        PageviewProp::Number(value.into())
    }
}

impl From<&str> for PageviewProp {
    fn from(value: &str) -> Self {
        PageviewProp::String(value.to_owned())
    }
}

impl From<String> for PageviewProp {
    fn from(value: String) -> Self {
        PageviewProp::String(value)
    }
}

impl fmt::Display for PageviewProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A candidate custom-property entry before the guard layer has looked at it.
///
/// Classification happens where values enter the system, as an explicit
/// discriminated union; the guards match on the variant instead of
/// introspecting an opaque value. The browser-flavored variants cover the
/// shapes a webview or DOM bridge hands to the tracker, each of which
/// stringifies but rarely to the intended text.
#[derive(Clone, Debug, PartialEq)]
pub enum PropEntry {
    Bool(bool),
    Number(f64),
    String(String),
    /// A space-joined class-list style collection (DOMTokenList analogue).
    TokenList(Vec<String>),
    /// A form input element carrying its current value (HTMLInputElement
    /// analogue). Coerces to the object tag, not to the value.
    FormInput(String),
    Array(Vec<PageviewProp>),
    /// A regular expression, carried by source text.
    Regex(String),
    Date(DateTime<Utc>),
    /// Anything that is none of the above. `rendered` is a best-effort
    /// textual form used in diagnostics.
    Unsupported {
        type_name: String,
        rendered: String,
    },
}

impl PropEntry {
    /// The type tag reported in diagnostics, using the names a JS runtime
    /// reports for these shapes.
    pub fn type_name(&self) -> &str {
        match self {
            PropEntry::Bool(_) => "Boolean",
            PropEntry::Number(_) => "Number",
            PropEntry::String(_) => "String",
            PropEntry::TokenList(_) => "DOMTokenList",
            PropEntry::FormInput(_) => "HTMLInputElement",
            PropEntry::Array(_) => "Array",
            PropEntry::Regex(_) => "RegExp",
            PropEntry::Date(_) => "Date",
            PropEntry::Unsupported { type_name, .. } => type_name,
        }
    }

    /// String coercion for the entry, matching JS `toString` semantics for
    /// each shape so the length guards measure what the sink would receive.
    pub fn render(&self) -> String {
        match self {
            PropEntry::Bool(flag) => flag.to_string(),
            PropEntry::Number(number) => number.to_string(),
            PropEntry::String(text) => text.clone(),
            PropEntry::TokenList(tokens) => tokens.join(" "),
            PropEntry::FormInput(_) => "[object HTMLInputElement]".to_owned(),
            PropEntry::Array(items) => items
                .iter()
                .map(PageviewProp::render)
                .collect::<Vec<_>>()
                .join(","),
            PropEntry::Regex(source) => format!("/{source}/"),
            PropEntry::Date(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true),
            PropEntry::Unsupported { rendered, .. } => rendered.clone(),
        }
    }
}

impl From<PageviewProp> for PropEntry {
    fn from(prop: PageviewProp) -> Self {
        match prop {
            PageviewProp::Bool(flag) => PropEntry::Bool(flag),
            PageviewProp::Number(number) => PropEntry::Number(number),
            PageviewProp::String(text) => PropEntry::String(text),
        }
    }
}

impl From<&PageviewProp> for PropEntry {
    fn from(prop: &PageviewProp) -> Self {
        prop.clone().into()
    }
}

/// A property name. Plausible accepts string and numeric keys; numeric keys
/// are stringified at the boundary so the mapping stays keyed by `String`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PropKey(String);

impl PropKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for PropKey {
    fn from(value: &str) -> Self {
        PropKey(value.to_owned())
    }
}

impl From<String> for PropKey {
    fn from(value: String) -> Self {
        PropKey(value)
    }
}

impl From<i64> for PropKey {
    fn from(value: i64) -> Self {
        PropKey(value.to_string())
    }
}

impl From<u64> for PropKey {
    fn from(value: u64) -> Self {
        PropKey(value.to_string())
    }
}

/// Custom pageview properties: either a wholesale on/off flag or a mapping
/// from property name to value. Keys are unique and order is irrelevant.
#[derive(Clone, Debug, PartialEq)]
pub enum PageviewProps {
    Flag(bool),
    Props(BTreeMap<String, PageviewProp>),
}

impl PageviewProps {
    pub fn new() -> Self {
        PageviewProps::Props(BTreeMap::new())
    }

    /// Builder-style insertion; numeric keys stringify through [`PropKey`].
    /// Inserting into a `Flag` variant promotes it to an empty mapping first.
    pub fn with(self, key: impl Into<PropKey>, value: impl Into<PageviewProp>) -> Self {
        let mut map = match self {
            PageviewProps::Props(map) => map,
            PageviewProps::Flag(_) => BTreeMap::new(),
        };
        map.insert(key.into().into_string(), value.into());
        PageviewProps::Props(map)
    }

    /// Number of entries; a flag carries none.
    pub fn len(&self) -> usize {
        match self {
            PageviewProps::Flag(_) => 0,
            PageviewProps::Props(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any custom properties should be attached to events at all.
    pub fn is_enabled(&self) -> bool {
        match self {
            PageviewProps::Flag(flag) => *flag,
            PageviewProps::Props(map) => !map.is_empty(),
        }
    }
}

impl Default for PageviewProps {
    fn default() -> Self {
        PageviewProps::Flag(false)
    }
}

impl From<bool> for PageviewProps {
    fn from(flag: bool) -> Self {
        PageviewProps::Flag(flag)
    }
}

impl From<BTreeMap<String, PageviewProp>> for PageviewProps {
    fn from(map: BTreeMap<String, PageviewProp>) -> Self {
        PageviewProps::Props(map)
    }
}

impl<K, V> FromIterator<(K, V)> for PageviewProps
where
    K: Into<PropKey>,
    V: Into<PageviewProp>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PageviewProps::Props(
            iter.into_iter()
                .map(|(key, value)| (key.into().into_string(), value.into()))
                .collect(),
        )
    }
}
