//! Error types for the observer.
//!
//! Errors fall into two groups. `ConfigError`, `RegistryError` and
//! `ObserverError` are fatal and stop the daemon from starting.
//! `MonitorError` is local to a single monitor spec: it is reported and the
//! monitor is left out of the active set, but its siblings keep running.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by a `Configurer` while parsing or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

impl SettingsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// A single monitor spec could not be turned into a prober.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("{kind:?} is not a registered probe kind, settings: {settings}")]
    UnknownKind { kind: String, settings: String },

    #[error("failed to parse settings for {kind} prober: {settings} due to: {source}")]
    SettingsParse {
        kind: String,
        settings: String,
        #[source]
        source: SettingsError,
    },

    #[error("failed to validate {kind} prober with settings: {settings} due to: {source}")]
    SettingsValidation {
        kind: String,
        settings: String,
        #[source]
        source: SettingsError,
    },

    #[error("{kind} monitor with settings: {settings} has a zero period")]
    InvalidPeriod { kind: String, settings: String },

    #[error("{kind} monitor with settings: {settings} has a zero timeout")]
    InvalidTimeout { kind: String, settings: String },
}

impl MonitorError {
    /// Normalized kind of the monitor this error belongs to.
    pub fn kind(&self) -> &str {
        match self {
            Self::UnknownKind { kind, .. }
            | Self::SettingsParse { kind, .. }
            | Self::SettingsValidation { kind, .. }
            | Self::InvalidPeriod { kind, .. }
            | Self::InvalidTimeout { kind, .. } => kind,
        }
    }

    /// Rendered settings of the monitor this error belongs to.
    pub fn settings(&self) -> &str {
        match self {
            Self::UnknownKind { settings, .. }
            | Self::SettingsParse { settings, .. }
            | Self::SettingsValidation { settings, .. }
            | Self::InvalidPeriod { settings, .. }
            | Self::InvalidTimeout { settings, .. } => settings,
        }
    }
}

/// Fatal configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("unsupported config format {0:?}, expected yaml, toml or json")]
    UnsupportedFormat(PathBuf),

    #[error("invalid `debugaddr`, {0:?}, not expected format")]
    DebugAddrFormat(String),

    #[error("invalid `debugaddr`, {addr:?}, {port} is not a valid port")]
    DebugAddrPort { addr: String, port: u32 },

    #[error("observer config is invalid, no monitors provided")]
    NoMonitors,

    #[error("no valid monitors, cannot continue ({} failed validation)", errors.len())]
    AllMonitorsInvalid { errors: Vec<MonitorError> },
}

/// Two probe kinds were registered under the same name.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("configurer: {0} has already been added")]
    DuplicateKind(String),
}

/// Anything that prevents an `Observer` from being built.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}
