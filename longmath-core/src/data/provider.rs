//! Text providers: where remote CSV bodies come from.
//!
//! The trait lets the Valet builder run against an in-memory body in tests.
//! The HTTP implementation makes one attempt with a fixed timeout and no
//! retry. A transient failure aborts the invocation.

use super::error::PipelineError;
use crate::config::HttpConfig;
use std::collections::HashMap;
use std::time::Duration;

pub trait TextProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// GET `url` with the given query parameters and return the body as text.
    fn fetch_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, PipelineError>;
}

/// Blocking HTTP provider.
pub struct HttpTextProvider {
    client: reqwest::blocking::Client,
}

impl HttpTextProvider {
    pub fn new(config: &HttpConfig) -> Result<Self, PipelineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PipelineError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl TextProvider for HttpTextProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, PipelineError> {
        tracing::info!(url, "fetching");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| PipelineError::Fetch(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch(format!("HTTP {status} for {url}")));
        }
        resp.text()
            .map_err(|e| PipelineError::Fetch(format!("reading body of {url}: {e}")))
    }
}

/// Serves fixed bodies keyed by URL. Used by tests and offline runs.
#[derive(Debug, Default, Clone)]
pub struct StaticTextProvider {
    bodies: HashMap<String, String>,
}

impl StaticTextProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }
}

impl TextProvider for StaticTextProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_text(&self, url: &str, _query: &[(&str, String)]) -> Result<String, PipelineError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| PipelineError::Fetch(format!("no body registered for {url}")))
    }
}
