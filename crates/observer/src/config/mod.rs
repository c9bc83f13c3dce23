//! Observer configuration.
//!
//! This module is responsible for:
//! - Deserializing the observer config from YAML, TOML or JSON
//! - Validating the debug address
//! - Validating every monitor spec, tolerating partial failure

pub mod loader;
pub mod monitor;
pub mod validation;

use serde::Deserialize;
use tracing::{error, info};

pub use loader::ConfigFormat;
pub use monitor::MonitorSpec;
pub use validation::parse_debug_addr;

use crate::error::{ConfigError, MonitorError};
use crate::probes::ProbeRegistry;

/// Top level observer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    /// Address of the debug server, in `:<port>` form
    #[serde(rename = "debugaddr")]
    pub debug_addr: String,

    /// Monitors in declaration order
    #[serde(default)]
    pub monitors: Vec<MonitorSpec>,
}

impl ObserverConfig {
    /// Port of the debug server
    pub fn debug_port(&self) -> Result<u16, ConfigError> {
        parse_debug_addr(&self.debug_addr)
    }

    /// Ensure `debug_addr` is well formed and names a valid port
    pub fn validate_debug_addr(&self) -> Result<(), ConfigError> {
        self.debug_port().map(|_| ())
    }

    /// Validate the whole config.
    ///
    /// Every monitor is validated independently; one invalid monitor never
    /// stops the others from being checked. The per-monitor errors are
    /// logged and returned so long as at least one monitor is valid. If none
    /// are, `AllMonitorsInvalid` is returned and the observer must not start.
    pub fn validate(&mut self, registry: &ProbeRegistry) -> Result<Vec<MonitorError>, ConfigError> {
        self.validate_debug_addr()?;

        if self.monitors.is_empty() {
            return Err(ConfigError::NoMonitors);
        }

        let errors = self.validate_monitors(registry);
        if errors.is_empty() {
            info!("all monitors passed validation");
        } else {
            error!("{} of {} monitors failed validation", errors.len(), self.monitors.len());
        }

        if errors.len() == self.monitors.len() {
            return Err(ConfigError::AllMonitorsInvalid { errors });
        }

        Ok(errors)
    }

    fn validate_monitors(&mut self, registry: &ProbeRegistry) -> Vec<MonitorError> {
        let mut errors = Vec::new();
        for (monitor, spec) in self.monitors.iter_mut().enumerate() {
            if let Err(err) = spec.validate(registry) {
                error!(monitor, kind = err.kind(), error = %err, "monitor is invalid");
                errors.push(err);
            }
        }
        errors
    }

    /// Monitors that passed validation
    pub fn valid_monitors(&self) -> impl Iterator<Item = &MonitorSpec> {
        self.monitors.iter().filter(|m| m.is_valid())
    }
}
