use url::Url;

use crate::error::{invalid_argument, AnalyticsResult};
use crate::props::PageviewProps;

/// Default Plausible instance.
pub const DEFAULT_API_HOST: &str = "https://plausible.io";

/// Configuration for the tracker component.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    api_host: String,
    compat: bool,
    domain: Vec<String>,
    enabled: bool,
    file_downloads: bool,
    hash: bool,
    local: bool,
    outbound_links: bool,
    pageview_props: PageviewProps,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_owned(),
            compat: false,
            domain: Vec::new(),
            // Enabled in release builds, off while developing.
            enabled: !cfg!(debug_assertions),
            file_downloads: false,
            hash: false,
            local: false,
            outbound_links: false,
            pageview_props: PageviewProps::default(),
        }
    }
}

impl TrackerConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: vec![domain.into()],
            ..Self::default()
        }
    }

    /// Points the tracker at a self-hosted instance. The host must be an
    /// absolute http(s) URL without trailing slash requirements.
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> AnalyticsResult<Self> {
        let api_host = api_host.into();
        let url = Url::parse(&api_host)
            .map_err(|err| invalid_argument(format!("apiHost is not a valid URL: {err}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid_argument(format!(
                "apiHost must use http or https, got {}",
                url.scheme()
            )));
        }
        self.api_host = api_host.trim_end_matches('/').to_owned();
        Ok(self)
    }

    /// Compatibility mode for tracking users on Internet Explorer.
    pub fn with_compat(mut self, compat: bool) -> Self {
        self.compat = compat;
        self
    }

    /// Adds another domain to track; multiple domains share one snippet.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain.push(domain.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Automatically track file downloads.
    /// (Requires manual goal configuration on Plausible.)
    pub fn with_file_downloads(mut self, file_downloads: bool) -> Self {
        self.file_downloads = file_downloads;
        self
    }

    /// Follow frontend navigation when using hash-based routing.
    pub fn with_hash(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }

    /// Allow tracking on localhost (useful in hybrid apps).
    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    /// Automatically track clicks on outbound links.
    /// (Requires manual goal configuration on Plausible.)
    pub fn with_outbound_links(mut self, outbound_links: bool) -> Self {
        self.outbound_links = outbound_links;
        self
    }

    /// Custom properties attached to every pageview event.
    pub fn with_pageview_props(mut self, props: impl Into<PageviewProps>) -> Self {
        self.pageview_props = props.into();
        self
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn compat(&self) -> bool {
        self.compat
    }

    pub fn domains(&self) -> &[String] {
        &self.domain
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn file_downloads(&self) -> bool {
        self.file_downloads
    }

    pub fn hash(&self) -> bool {
        self.hash
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn outbound_links(&self) -> bool {
        self.outbound_links
    }

    pub fn pageview_props(&self) -> &PageviewProps {
        &self.pageview_props
    }

    /// The comma-joined `data-domain` attribute value.
    pub fn data_domain(&self) -> String {
        self.domain.join(",")
    }

    /// The event ingestion endpoint of the configured instance.
    pub fn event_endpoint(&self) -> String {
        format!("{}/api/event", self.api_host)
    }

    /// Composes the tracker script source from the enabled options. Each
    /// option contributes a dotted segment, matching the naming scheme the
    /// Plausible CDN serves, e.g. `https://plausible.io/js/script.hash.local.js`.
    pub fn script_src(&self) -> String {
        let mut segments = vec!["script".to_owned()];
        if self.compat {
            segments.push("compat".to_owned());
        }
        if self.hash {
            segments.push("hash".to_owned());
        }
        if self.local {
            segments.push("local".to_owned());
        }
        if self.file_downloads {
            segments.push("file-downloads".to_owned());
        }
        if self.outbound_links {
            segments.push("outbound-links".to_owned());
        }
        if self.pageview_props.is_enabled() {
            segments.push("pageview-props".to_owned());
        }
        segments.push("js".to_owned());
        format!("{}/js/{}", self.api_host, segments.join("."))
    }
}
