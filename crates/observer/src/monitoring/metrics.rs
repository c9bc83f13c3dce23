use std::time::Duration;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Buckets for latencies of requests made over the public internet, in seconds.
pub const INTERNET_FACING_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.5, 5.0, 7.5, 10.0, 15.0, 30.0, 45.0];

/// Outcome of a single check, used as the `result` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationResult {
    Success,
    Failure,
}

impl ObservationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationResult::Success => "success",
            ObservationResult::Failure => "failure",
        }
    }
}

impl From<bool> for ObservationResult {
    fn from(success: bool) -> Self {
        if success { Self::Success } else { Self::Failure }
    }
}

/// Instruments shared by the observer and every monitor loop.
///
/// Both are safe to update concurrently from any number of tasks.
#[derive(Clone)]
pub struct ObserverMetrics {
    monitors: IntCounterVec,
    observations: HistogramVec,
}

impl std::fmt::Debug for ObserverMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverMetrics").finish_non_exhaustive()
    }
}

impl ObserverMetrics {
    /// Create the instruments and register them with `registry`.
    ///
    /// Fails if they are already registered there.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let monitors = IntCounterVec::new(
            Opts::new("configured_monitors", "count of configured monitors"),
            &["name", "kind", "valid"],
        )?;
        let observations = HistogramVec::new(
            HistogramOpts::new(
                "observation_duration",
                "time taken for a monitor to perform a request/query",
            )
            .buckets(INTERNET_FACING_BUCKETS.to_vec()),
            &["name", "kind", "result"],
        )?;

        registry.register(Box::new(observations.clone()))?;
        registry.register(Box::new(monitors.clone()))?;

        Ok(Self { monitors, observations })
    }

    /// Count one configured monitor
    pub fn record_configured(&self, name: &str, kind: &str, valid: bool) {
        let valid = if valid { "true" } else { "false" };
        self.monitors.with_label_values(&[name, kind, valid]).inc();
    }

    /// Record the outcome of one executed check
    pub fn record_observation(&self, name: &str, kind: &str, success: bool, elapsed: Duration) {
        let result = ObservationResult::from(success);
        self.observations
            .with_label_values(&[name, kind, result.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    /// Current value of the configured monitors counter for one label set.
    ///
    /// Read-only view for code embedding the observer that wants to inspect
    /// the counters without scraping the registry.
    pub fn configured_count(&self, name: &str, kind: &str, valid: bool) -> u64 {
        let valid = if valid { "true" } else { "false" };
        self.monitors.with_label_values(&[name, kind, valid]).get()
    }

    /// Number of observations recorded for one label set.
    ///
    /// Read-only view, see `configured_count`.
    pub fn observation_count(&self, name: &str, kind: &str, result: ObservationResult) -> u64 {
        self.observations.with_label_values(&[name, kind, result.as_str()]).get_sample_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use prometheus::{Encoder, TextEncoder};

    #[test]
    fn test_register_twice_fails() {
        let registry = Registry::new();
        assert!(ObserverMetrics::register(&registry).is_ok());
        assert!(matches!(
            ObserverMetrics::register(&registry),
            Err(prometheus::Error::AlreadyReg)
        ));
    }

    #[test]
    fn test_record_configured() {
        let registry = Registry::new();
        let metrics = ObserverMetrics::register(&registry).unwrap();

        metrics.record_configured("https://example.com-[200]", "http", true);
        metrics.record_configured("", "dns", false);
        metrics.record_configured("", "dns", false);

        assert_eq!(metrics.configured_count("https://example.com-[200]", "http", true), 1);
        assert_eq!(metrics.configured_count("", "dns", false), 2);
        assert_eq!(metrics.configured_count("", "dns", true), 0);
    }

    #[test]
    fn test_record_observation() {
        let registry = Registry::new();
        let metrics = ObserverMetrics::register(&registry).unwrap();

        metrics.record_observation("probe", "http", true, Duration::from_millis(250));
        metrics.record_observation("probe", "http", false, Duration::from_secs(3));
        metrics.record_observation("probe", "http", false, Duration::from_secs(4));

        assert_eq!(metrics.observation_count("probe", "http", ObservationResult::Success), 1);
        assert_eq!(metrics.observation_count("probe", "http", ObservationResult::Failure), 2);

        let failure = metrics.observations.with_label_values(&["probe", "http", "failure"]);
        assert!((failure.get_sample_sum() - 7.0).abs() < f64::EPSILON);

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer).unwrap();
        let exposition = String::from_utf8(buffer).unwrap();
        assert!(exposition.contains(
            r#"observation_duration_count{kind="http",name="probe",result="failure"} 2"#
        ));
    }
}
