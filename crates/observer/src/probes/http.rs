//! HTTP probe.
//!
//! Performs a single GET request and checks the response status code against
//! a configured set of acceptable codes.

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Configurer, Prober, Settings, parse_settings};
use crate::error::SettingsError;

/// Client shared by every HTTP probe, so checks reuse pooled connections.
/// Deadlines are set per request.
static CLIENT: LazyLock<reqwest::Result<reqwest::Client>> = LazyLock::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("uppe-observer/", env!("CARGO_PKG_VERSION")))
        .build()
});

fn shared_client() -> Result<&'static reqwest::Client, SettingsError> {
    CLIENT
        .as_ref()
        .map_err(|e| SettingsError::invalid(format!("failed to build http client: {e}")))
}

/// Settings for monitors of kind `http`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HttpConf {
    /// The URL to request
    pub url: String,

    /// Acceptable response status codes
    pub rcodes: Vec<u16>,
}

impl HttpConf {
    pub const KIND: &'static str = "http";

    /// Empty prototype stored in the registry.
    pub fn prototype() -> Box<dyn Configurer> {
        Box::new(Self::default())
    }

    fn validate_url(&self) -> Result<(), SettingsError> {
        let parsed = Url::parse(&self.url)
            .map_err(|e| SettingsError::invalid(format!("invalid url {:?}: {}", self.url, e)))?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(SettingsError::invalid(format!("unsupported url scheme: {other}"))),
        }
    }

    fn validate_rcodes(&self) -> Result<(), SettingsError> {
        if self.rcodes.is_empty() {
            return Err(SettingsError::invalid("no response codes provided"));
        }

        if let Some(code) = self.rcodes.iter().find(|c| !(100..=599).contains(*c)) {
            return Err(SettingsError::invalid(format!("invalid response code: {code}")));
        }

        Ok(())
    }
}

impl Configurer for HttpConf {
    fn parse(&self, settings: &Settings) -> Result<Box<dyn Configurer>, SettingsError> {
        let conf: HttpConf = parse_settings(settings)?;
        Ok(Box::new(conf))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        self.validate_url()?;
        self.validate_rcodes()?;
        shared_client().map(|_| ())
    }

    fn into_prober(self: Box<Self>) -> Arc<dyn Prober> {
        Arc::new(HttpProbe { url: self.url, rcodes: self.rcodes })
    }
}

/// Prober for monitors of kind `http`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProbe {
    url: String,
    rcodes: Vec<u16>,
}

impl HttpProbe {
    fn expected_rcode(&self, got: u16) -> bool {
        self.rcodes.contains(&got)
    }

    async fn get(&self, client: &reqwest::Client, timeout: Duration) -> reqwest::Result<u16> {
        let response = client.get(&self.url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }
}

#[async_trait::async_trait]
impl Prober for HttpProbe {
    fn name(&self) -> String {
        let codes: Vec<String> = self.rcodes.iter().map(u16::to_string).collect();
        format!("{}-[{}]", self.url, codes.join(" "))
    }

    fn kind(&self) -> &'static str {
        HttpConf::KIND
    }

    async fn probe(&self, timeout: Duration) -> (bool, Duration) {
        let start = Instant::now();

        let client = match shared_client() {
            Ok(client) => client,
            Err(e) => {
                debug!(url = %self.url, error = %e, "HTTP client unavailable");
                return (false, start.elapsed());
            }
        };

        // TODO: support request methods other than GET
        match self.get(client, timeout).await {
            Ok(status) => (self.expected_rcode(status), start.elapsed()),
            Err(e) => {
                debug!(url = %self.url, error = %e, "HTTP request failed");
                (false, start.elapsed())
            }
        }
    }
}
