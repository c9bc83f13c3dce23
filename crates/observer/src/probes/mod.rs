//! Probe kinds and the contract they implement.
//!
//! A probe kind contributes a `Configurer` prototype, which parses a monitor's
//! open `settings` mapping into a typed form, validates it and finally turns
//! it into a `Prober`. The core never special-cases a kind by name; it only
//! talks to these two traits through the `ProbeRegistry`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::SettingsError;

pub mod http;
pub mod registry;
pub mod tcp;

pub use http::{HttpConf, HttpProbe};
pub use registry::{BUILTIN_PROBES, ConfigurerFactory, ProbeRegistry};
pub use tcp::{TcpConf, TcpProbe};

/// Open key-value mapping received in the `settings` field of a monitor.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Runtime capability that performs checks for one configured monitor.
#[async_trait::async_trait]
pub trait Prober: fmt::Debug + Send + Sync {
    /// Stable identity, used as the `name` metric label.
    fn name(&self) -> String;

    /// Probe kind, used as the `kind` metric label.
    fn kind(&self) -> &'static str;

    /// Perform a single check bounded by `timeout`.
    ///
    /// Returns whether the check succeeded and how long it took. Transport
    /// errors are reported as `false`, never as an error.
    async fn probe(&self, timeout: Duration) -> (bool, Duration);
}

/// Parses and validates settings for one probe kind.
///
/// The instance stored in the registry is a stateless prototype; `parse`
/// returns a new configurer holding the typed settings.
pub trait Configurer: fmt::Debug + Send + Sync {
    /// Structural parse of the open settings mapping.
    fn parse(&self, settings: &Settings) -> Result<Box<dyn Configurer>, SettingsError>;

    /// Semantic checks beyond structure.
    fn validate(&self) -> Result<(), SettingsError>;

    /// Convert validated settings into a prober. Must not fail once
    /// `validate` has succeeded.
    fn into_prober(self: Box<Self>) -> Arc<dyn Prober>;
}

/// Deserialize a settings mapping into a kind-specific type.
pub(crate) fn parse_settings<T: DeserializeOwned>(settings: &Settings) -> Result<T, SettingsError> {
    Ok(serde_json::from_value(serde_json::Value::Object(settings.clone()))?)
}
