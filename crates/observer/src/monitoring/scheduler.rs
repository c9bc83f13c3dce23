use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval_at, timeout};
use tracing::{debug, warn};

use super::metrics::ObserverMetrics;
use crate::config::MonitorSpec;
use crate::probes::Prober;

/// A prober bound to its schedule.
///
/// Each monitor owns its prober and runs its own loop; monitors share
/// nothing except the metrics.
#[derive(Debug, Clone)]
pub struct Monitor {
    period: Duration,
    timeout: Duration,
    prober: Arc<dyn Prober>,
}

impl Monitor {
    pub fn new(prober: Arc<dyn Prober>, period: Duration, timeout: Duration) -> Self {
        Self { period, timeout, prober }
    }

    /// Build a monitor from a validated spec. Returns `None` if the spec is
    /// not valid.
    pub fn from_spec(spec: &MonitorSpec) -> Option<Self> {
        let prober = spec.prober()?.clone();
        Some(Self::new(prober, spec.period, spec.timeout_duration()))
    }

    pub fn name(&self) -> String {
        self.prober.name()
    }

    pub fn kind(&self) -> &'static str {
        self.prober.kind()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one check to completion.
    ///
    /// The check is bounded by the monitor's timeout. A prober that panics
    /// or overruns its deadline counts as a failed check.
    pub async fn observe(&self) -> (bool, Duration) {
        let start = Instant::now();
        let check = AssertUnwindSafe(self.prober.probe(self.timeout)).catch_unwind();

        match timeout(self.timeout, check).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                warn!(monitor = %self.name(), kind = self.kind(), "prober panicked");
                (false, start.elapsed())
            }
            Err(_) => (false, start.elapsed()),
        }
    }

    /// Run checks every `period` until `true` is sent on `shutdown`.
    ///
    /// Checks run strictly one after another. If a check overruns the
    /// period the next tick is delayed, never skipped or batched. Other
    /// values and a dropped sender leave the loop running.
    pub async fn run(self, metrics: ObserverMetrics, mut shutdown: watch::Receiver<bool>) {
        let name = self.name();
        let kind = self.kind();

        let mut ticker = interval_at(tokio::time::Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(monitor = %name, kind, period = ?self.period, "monitor loop starting");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                Ok(_) = shutdown.wait_for(|stop| *stop) => break,
            }

            let (success, elapsed) = tokio::select! {
                outcome = self.observe() => outcome,
                Ok(_) = shutdown.wait_for(|stop| *stop) => break,
            };

            if !success {
                debug!(monitor = %name, kind, ?elapsed, "check failed");
            }
            metrics.record_observation(&name, kind, success, elapsed);
        }

        debug!(monitor = %name, kind, "monitor loop stopped");
    }
}
