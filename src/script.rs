//! Renders the `<script>` snippet that loads the Plausible tracker into the
//! document head.

use crate::config::{TrackerConfig, DEFAULT_API_HOST};
use crate::error::{invalid_argument, AnalyticsResult};

/// A renderable tracker snippet derived from a [`TrackerConfig`].
#[derive(Clone, Debug)]
pub struct ScriptTag {
    config: TrackerConfig,
}

impl ScriptTag {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn src(&self) -> String {
        self.config.script_src()
    }

    /// The attributes carried by the tag, in render order. `data-api` only
    /// appears for self-hosted instances.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let mut attrs = vec![
            ("defer".to_owned(), String::new()),
            ("data-domain".to_owned(), self.config.data_domain()),
        ];
        if self.config.api_host() != DEFAULT_API_HOST {
            attrs.push(("data-api".to_owned(), self.config.event_endpoint()));
        }
        attrs.push(("src".to_owned(), self.src()));
        attrs
    }

    /// Renders the full tag. At least one tracked domain is required; a
    /// library has no current hostname to fall back on.
    pub fn render(&self) -> AnalyticsResult<String> {
        if self.config.domains().is_empty() {
            return Err(invalid_argument(
                "at least one tracked domain is required to render the script tag",
            ));
        }

        let attrs = self
            .attributes()
            .into_iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name
                } else {
                    format!("{name}=\"{}\"", escape_attribute(&value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        Ok(format!("<script {attrs}></script>"))
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
