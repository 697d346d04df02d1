use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::config::TrackerConfig;
use crate::error::{invalid_argument, props_limit, AnalyticsResult};
use crate::guards::{
    is_custom_prop_entry_limit, is_custom_props_limit, CUSTOM_PROPS_LIMIT, PROP_NAME_CHAR_LIMIT,
    PROP_VALUE_CHAR_LIMIT,
};
use crate::logger::Logger;
use crate::props::{PageviewProps, PropEntry};

/// A single pageview event in the shape the Plausible `/api/event` endpoint
/// expects. Serializing it yields the request body; sending it is the
/// configured sink's business.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageviewEvent {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "u")]
    pub url: String,
    #[serde(rename = "d")]
    pub domain: String,
    #[serde(rename = "p", skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, String>,
}

/// Receives validated events. The crate ships no network implementation; the
/// external tracker script (or a caller-supplied HTTP client) owns delivery.
pub trait EventSink: Send + Sync {
    fn send(&self, event: &PageviewEvent) -> AnalyticsResult<()>;
}

/// Handle for the tracker component. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Plausible {
    inner: Arc<PlausibleInner>,
}

impl fmt::Debug for Plausible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plausible")
            .field("domain", &self.inner.config.data_domain())
            .finish()
    }
}

struct PlausibleInner {
    config: TrackerConfig,
    logger: Logger,
    events: Mutex<Vec<PageviewEvent>>,
    sink: Mutex<Option<Arc<dyn EventSink>>>,
    collection_enabled: AtomicBool,
}

impl Plausible {
    pub fn new(config: TrackerConfig) -> Self {
        let enabled = config.enabled();
        let inner = PlausibleInner {
            config,
            logger: Logger::new("@plausible/analytics"),
            events: Mutex::new(Vec::new()),
            sink: Mutex::new(None),
            collection_enabled: AtomicBool::new(enabled),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    /// The diagnostic channel used by the guard layer. Install a handler here
    /// to capture warnings about dropped or risky properties.
    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    /// Records a pageview for `url` carrying the configured pageview props.
    pub fn pageview(&self, url: &str) -> AnalyticsResult<PageviewEvent> {
        let props = self.inner.config.pageview_props().clone();
        self.pageview_with_props(url, &props)
    }

    /// Records a pageview for `url` with explicit props, overriding the
    /// configured ones for this event only.
    pub fn pageview_with_props(
        &self,
        url: &str,
        props: &PageviewProps,
    ) -> AnalyticsResult<PageviewEvent> {
        if url.trim().is_empty() {
            return Err(invalid_argument("Pageview URL must not be empty"));
        }

        let props = self.sanitize_props(props)?;
        let event = PageviewEvent {
            name: "pageview".to_owned(),
            url: url.to_owned(),
            domain: self.inner.config.data_domain(),
            props,
        };

        let mut events = self.inner.events.lock().unwrap();
        events.push(event.clone());
        drop(events);

        self.dispatch_event(&event)?;
        Ok(event)
    }

    /// Every event recorded by this handle, dispatched or not.
    pub fn recorded_events(&self) -> Vec<PageviewEvent> {
        self.inner.events.lock().unwrap().clone()
    }

    /// Installs the sink that receives validated events.
    pub fn set_sink(&self, sink: Arc<dyn EventSink>) {
        *self.inner.sink.lock().unwrap() = Some(sink);
    }

    /// Enables or disables collection. When disabled, events are still
    /// recorded locally but are not forwarded to the sink.
    pub fn set_collection_enabled(&self, enabled: bool) {
        self.inner
            .collection_enabled
            .store(enabled, Ordering::SeqCst);
    }

    pub fn collection_enabled(&self) -> bool {
        self.inner.collection_enabled.load(Ordering::SeqCst)
    }

    /// Runs the guard layer over a props value.
    ///
    /// A mapping over the 30-entry limit rejects the whole event, since
    /// truncating would silently pick arbitrary winners. An individual entry
    /// whose name or value fails its guard is dropped with a warning and the
    /// event proceeds with the surviving entries.
    fn sanitize_props(&self, props: &PageviewProps) -> AnalyticsResult<BTreeMap<String, String>> {
        if !is_custom_props_limit(props) {
            return Err(props_limit(format!(
                "Pageview carries {} custom properties; Plausible accepts at most {}",
                props.len(),
                CUSTOM_PROPS_LIMIT
            )));
        }

        let map = match props {
            PageviewProps::Flag(_) => return Ok(BTreeMap::new()),
            PageviewProps::Props(map) => map,
        };

        let logger = &self.inner.logger;
        let mut sanitized = BTreeMap::new();
        for (name, value) in map {
            let name_entry = PropEntry::String(name.clone());
            if !is_custom_prop_entry_limit(logger, PROP_NAME_CHAR_LIMIT, &name_entry) {
                logger.warn(format!("Dropping custom property with oversized name: {name}"));
                continue;
            }

            let value_entry = PropEntry::from(value);
            if !is_custom_prop_entry_limit(logger, PROP_VALUE_CHAR_LIMIT, &value_entry) {
                logger.warn(format!("Dropping custom property {name}: value failed validation"));
                continue;
            }

            sanitized.insert(name.clone(), value_entry.render());
        }
        Ok(sanitized)
    }

    fn dispatch_event(&self, event: &PageviewEvent) -> AnalyticsResult<()> {
        let sink = {
            let guard = self.inner.sink.lock().unwrap();
            guard.clone()
        };

        if self.collection_enabled() {
            if let Some(sink) = sink {
                sink.send(event)?;
            }
        }

        Ok(())
    }
}
