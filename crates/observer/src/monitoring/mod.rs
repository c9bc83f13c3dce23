/// Monitoring engine module - runs configured monitors
///
/// This module is responsible for:
/// - Running one check loop per active monitor
/// - Recording configured monitors and check outcomes as metrics
pub mod metrics;
pub mod scheduler;

pub use metrics::{INTERNET_FACING_BUCKETS, ObservationResult, ObserverMetrics};
pub use scheduler::Monitor;
