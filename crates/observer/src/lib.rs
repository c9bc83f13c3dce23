//! Observer - configuration-driven probing for Uppe
//!
//! Operators declare a set of monitors, each bound to a probe kind with
//! kind-specific settings. The observer validates them, runs every valid
//! monitor on its own schedule and records the outcomes as Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod monitoring;
pub mod observer;
pub mod probes;

// Re-export main types
pub use config::{MonitorSpec, ObserverConfig};
pub use error::{ConfigError, MonitorError, ObserverError, RegistryError, SettingsError};
pub use monitoring::{Monitor, ObservationResult, ObserverMetrics};
pub use observer::Observer;
pub use probes::{Configurer, ProbeRegistry, Prober, Settings};
