use std::io::Error as IoError;

use observer::{ConfigError, ObserverError, RegistryError};
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("error while initializing probes: {0}")]
    Registry(#[from] RegistryError),
    #[error("failed to build observer: {0}")]
    Observer(#[from] ObserverError),
    #[error("monitor tasks failed to stop: {0}")]
    Join(#[from] JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_error_message() {
        let metrics = AppError::from(ObserverError::Metrics(prometheus::Error::AlreadyReg));
        assert!(
            metrics.to_string().starts_with("failed to build observer: failed to register metrics")
        );

        let config = AppError::from(ObserverError::Config(ConfigError::NoMonitors));
        assert_eq!(
            config.to_string(),
            "failed to build observer: observer config is invalid, no monitors provided"
        );
    }
}
