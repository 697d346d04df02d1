//! Rust port of the Plausible Analytics client component.
//!
//! # Overview
//!
//! The crate centers on a [`Plausible`] handle configured through
//! [`TrackerConfig`]. A pageview call runs the caller's custom properties
//! through the guard layer in [`guards`], records the event, and hands it to
//! a pluggable [`EventSink`] — delivery itself belongs to the external
//! tracker script or to whatever HTTP client the embedding application
//! supplies. [`script::ScriptTag`] renders the `<script>` snippet that loads
//! the hosted tracker script.
//!
//! # Validation
//!
//! Plausible accepts booleans, numbers, and strings as custom-property
//! values, at most 30 properties per event, 300 characters per name, and
//! 2000 characters per value. The guards in [`guards`] enforce these limits
//! as pure predicates: a rejected value yields `false` plus a diagnostic
//! through the crate's [`logger::Logger`], never a panic.
//!
//! # Example
//!
//! ```
//! use plausible_rs_sdk::{PageviewProps, Plausible, TrackerConfig};
//!
//! let config = TrackerConfig::new("example.com")
//!     .with_enabled(true)
//!     .with_pageview_props(PageviewProps::new().with("plan", "starter"));
//! let plausible = Plausible::new(config);
//! let event = plausible.pageview("https://example.com/pricing").unwrap();
//! assert_eq!(event.props.get("plan").map(String::as_str), Some("starter"));
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod guards;
pub mod logger;
pub mod props;
pub mod script;

pub use api::{EventSink, PageviewEvent, Plausible};
pub use config::{TrackerConfig, DEFAULT_API_HOST};
pub use error::{AnalyticsError, AnalyticsErrorCode, AnalyticsResult};
pub use props::{PageviewProp, PageviewProps, PropEntry, PropKey};
