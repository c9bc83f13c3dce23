//! The observer owns the active monitors and the shared metrics.

use prometheus::Registry;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ObserverConfig;
use crate::error::{MonitorError, ObserverError};
use crate::monitoring::{Monitor, ObserverMetrics};
use crate::probes::ProbeRegistry;

/// Validated configuration turned into runnable monitors
#[derive(Debug)]
pub struct Observer {
    metrics: ObserverMetrics,
    monitors: Vec<Monitor>,
    invalid: Vec<MonitorError>,
}

impl Observer {
    /// Validate `config` against `probes` and build the active monitor set.
    ///
    /// Fails if the config is unusable as a whole or the metrics cannot be
    /// registered with `registry`. Monitors that failed validation are
    /// counted in the configured monitors metric and otherwise left out.
    pub fn new(
        mut config: ObserverConfig,
        probes: &ProbeRegistry,
        registry: &Registry,
    ) -> Result<Self, ObserverError> {
        let invalid = config.validate(probes)?;
        let metrics = ObserverMetrics::register(registry)?;

        let mut monitors = Vec::with_capacity(config.monitors.len() - invalid.len());
        for spec in &config.monitors {
            match Monitor::from_spec(spec) {
                Some(monitor) => {
                    metrics.record_configured(&monitor.name(), monitor.kind(), true);
                    monitors.push(monitor);
                }
                None => metrics.record_configured("", &spec.kind, false),
            }
        }

        info!(active = monitors.len(), invalid = invalid.len(), "observer configured");
        Ok(Self { metrics, monitors, invalid })
    }

    /// Monitors that will run when the observer starts
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Validation errors of the monitors that were left out
    pub fn invalid(&self) -> &[MonitorError] {
        &self.invalid
    }

    pub fn metrics(&self) -> &ObserverMetrics {
        &self.metrics
    }

    /// Run every monitor until `shutdown` fires, then wait for all of them
    /// to stop.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let Self { metrics, monitors, .. } = self;

        if *shutdown.borrow() {
            return;
        }

        let handles: Vec<JoinHandle<()>> = monitors
            .into_iter()
            .map(|monitor| tokio::spawn(monitor.run(metrics.clone(), shutdown.clone())))
            .collect();
        info!("started {} monitors", handles.len());

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "monitor task failed");
            }
        }
        info!("all monitors stopped");
    }

    /// Run every monitor forever.
    pub async fn start(self) {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.run(shutdown_rx).await;
    }
}
