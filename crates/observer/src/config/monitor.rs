//! Configuration of a single monitor and its validation pipeline.
//!
//! A `MonitorSpec` starts out unvalidated. `validate` normalizes its kind,
//! resolves the settings against the probe registry and runs the semantic
//! checks. On success the spec holds a frozen `Prober`; on failure it holds
//! nothing and is kept only for reporting.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::MonitorError;
use crate::probes::{Configurer, ProbeRegistry, Prober, Settings};

/// A monitor as declared by the operator
#[derive(Clone, Deserialize)]
pub struct MonitorSpec {
    /// Interval between checks, e.g. `"30s"`
    #[serde(deserialize_with = "deserialize_period")]
    pub period: Duration,

    /// Deadline for a single check, in seconds
    pub timeout: u64,

    /// Registered probe kind
    pub kind: String,

    /// Kind-specific settings
    #[serde(default)]
    pub settings: Settings,

    #[serde(skip)]
    prober: Option<Arc<dyn Prober>>,
}

impl MonitorSpec {
    pub fn new(kind: impl Into<String>, period: Duration, timeout: u64, settings: Settings) -> Self {
        Self { period, timeout, kind: kind.into(), settings, prober: None }
    }

    /// Whether the last call to `validate` succeeded
    pub fn is_valid(&self) -> bool {
        self.prober.is_some()
    }

    /// The frozen prober, present only once the spec is valid
    pub fn prober(&self) -> Option<&Arc<dyn Prober>> {
        self.prober.as_ref()
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Normalize, resolve and validate this spec.
    ///
    /// Each step short-circuits. The spec is only marked valid when all of
    /// them pass.
    pub fn validate(&mut self, registry: &ProbeRegistry) -> Result<(), MonitorError> {
        self.prober = None;
        self.normalize();

        let conf = self.resolve_settings(registry)?;
        self.validate_schedule()?;
        conf.validate().map_err(|source| MonitorError::SettingsValidation {
            kind: self.kind.clone(),
            settings: format!("{conf:?}"),
            source,
        })?;

        self.prober = Some(conf.into_prober());
        Ok(())
    }

    fn normalize(&mut self) {
        self.kind = self.kind.trim().to_lowercase();
    }

    fn rendered_settings(&self) -> String {
        serde_json::Value::Object(self.settings.clone()).to_string()
    }

    fn resolve_settings(&self, registry: &ProbeRegistry) -> Result<Box<dyn Configurer>, MonitorError> {
        let prototype = registry.lookup(&self.kind).ok_or_else(|| MonitorError::UnknownKind {
            kind: self.kind.clone(),
            settings: self.rendered_settings(),
        })?;
        prototype.parse(&self.settings).map_err(|source| MonitorError::SettingsParse {
            kind: self.kind.clone(),
            settings: self.rendered_settings(),
            source,
        })
    }

    fn validate_schedule(&self) -> Result<(), MonitorError> {
        if self.period.is_zero() {
            return Err(MonitorError::InvalidPeriod {
                kind: self.kind.clone(),
                settings: self.rendered_settings(),
            });
        }
        if self.timeout == 0 {
            return Err(MonitorError::InvalidTimeout {
                kind: self.kind.clone(),
                settings: self.rendered_settings(),
            });
        }
        if self.timeout_duration() > self.period {
            warn!(
                kind = %self.kind,
                period = ?self.period,
                timeout = self.timeout,
                "monitor timeout is longer than its period"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for MonitorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorSpec")
            .field("period", &self.period)
            .field("timeout", &self.timeout)
            .field("kind", &self.kind)
            .field("settings", &self.settings)
            .field("valid", &self.is_valid())
            .finish()
    }
}

fn deserialize_period<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn spec(kind: &str, settings: serde_json::Value) -> MonitorSpec {
        MonitorSpec::new(kind, Duration::from_secs(10), 5, settings.as_object().cloned().unwrap())
    }

    fn http_settings() -> serde_json::Value {
        json!({"url": "https://letsencrypt.org", "rcodes": [200]})
    }

    #[test]
    fn test_valid_spec() {
        let registry = ProbeRegistry::builtin().unwrap();
        let mut spec = spec("http", http_settings());

        assert!(!spec.is_valid());
        spec.validate(&registry).unwrap();
        assert!(spec.is_valid());
        assert_eq!(spec.prober().unwrap().name(), "https://letsencrypt.org-[200]");
    }

    #[test]
    fn test_kind_is_normalized() {
        let registry = ProbeRegistry::builtin().unwrap();
        let mut spec = spec("  HTTP ", http_settings());

        spec.validate(&registry).unwrap();
        assert_eq!(spec.kind, "http");
    }

    #[test]
    fn test_unknown_kind() {
        let registry = ProbeRegistry::builtin().unwrap();
        let mut spec = spec("dns", json!({"server": "8.8.8.8:53"}));

        let err = spec.validate(&registry).unwrap_err();
        assert!(matches!(err, MonitorError::UnknownKind { ref kind, .. } if kind == "dns"));
        assert_eq!(err.settings(), r#"{"server":"8.8.8.8:53"}"#);
        assert!(err.to_string().contains("8.8.8.8:53"));
        assert!(!spec.is_valid());
        assert!(spec.prober().is_none());
    }

    #[test]
    fn test_missing_required_setting() {
        let registry = ProbeRegistry::builtin().unwrap();
        let mut spec = spec("http", json!({"url": "https://letsencrypt.org"}));

        let err = spec.validate(&registry).unwrap_err();
        assert!(matches!(err, MonitorError::SettingsParse { ref kind, .. } if kind == "http"));
        assert!(!spec.is_valid());
    }

    #[test]
    fn test_semantic_validation_failure() {
        let registry = ProbeRegistry::builtin().unwrap();
        let mut spec = spec("http", json!({"url": "gopher://letsencrypt.org", "rcodes": [200]}));

        let err = spec.validate(&registry).unwrap_err();
        assert!(matches!(err, MonitorError::SettingsValidation { .. }));
        assert!(err.to_string().contains("gopher://letsencrypt.org"));
        assert!(!spec.is_valid());
    }

    #[test]
    fn test_zero_period_and_timeout() {
        let registry = ProbeRegistry::builtin().unwrap();

        let mut zero_period = spec("http", http_settings());
        zero_period.period = Duration::ZERO;
        let err = zero_period.validate(&registry).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPeriod { .. }));
        assert!(err.settings().contains("letsencrypt.org"));

        let mut zero_timeout = spec("http", http_settings());
        zero_timeout.timeout = 0;
        let err = zero_timeout.validate(&registry).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidTimeout { .. }));
        assert!(err.to_string().contains("letsencrypt.org"));
    }

    #[test]
    fn test_revalidation_clears_prober() {
        let registry = ProbeRegistry::builtin().unwrap();
        let mut spec = spec("http", http_settings());
        spec.validate(&registry).unwrap();

        spec.kind = "dns".to_string();
        assert!(spec.validate(&registry).is_err());
        assert!(!spec.is_valid());
    }

    #[test]
    fn test_deserialize_period() {
        let spec: MonitorSpec = serde_json::from_value(json!({
            "period": "1m30s",
            "timeout": 5,
            "kind": "HTTP",
            "settings": {"url": "https://letsencrypt.org", "rcodes": [200]}
        }))
        .unwrap();

        assert_eq!(spec.period, Duration::from_secs(90));
        assert!(!spec.is_valid());
    }

    #[test]
    fn test_deserialize_bad_period() {
        let result: Result<MonitorSpec, _> = serde_json::from_value(json!({
            "period": "soon",
            "timeout": 5,
            "kind": "http"
        }));
        assert!(result.is_err());
    }
}
