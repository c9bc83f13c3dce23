//! TCP probe. Succeeds when a connection to `hostport` is established.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{Configurer, Prober, Settings, parse_settings};
use crate::error::SettingsError;

/// Settings for monitors of kind `tcp`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TcpConf {
    /// Target in `host:port` form
    pub hostport: String,
}

impl TcpConf {
    pub const KIND: &'static str = "tcp";

    /// Empty prototype stored in the registry.
    pub fn prototype() -> Box<dyn Configurer> {
        Box::new(Self::default())
    }
}

impl Configurer for TcpConf {
    fn parse(&self, settings: &Settings) -> Result<Box<dyn Configurer>, SettingsError> {
        let conf: TcpConf = parse_settings(settings)?;
        Ok(Box::new(conf))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let (host, port) = self
            .hostport
            .rsplit_once(':')
            .ok_or_else(|| SettingsError::invalid("hostport must be in format host:port"))?;

        if host.is_empty() {
            return Err(SettingsError::invalid("hostport is missing a host"));
        }

        match port.parse::<u16>() {
            Ok(0) | Err(_) => Err(SettingsError::invalid(format!("invalid port: {port:?}"))),
            Ok(_) => Ok(()),
        }
    }

    fn into_prober(self: Box<Self>) -> Arc<dyn Prober> {
        Arc::new(TcpProbe { hostport: self.hostport })
    }
}

/// Prober for monitors of kind `tcp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpProbe {
    hostport: String,
}

#[async_trait::async_trait]
impl Prober for TcpProbe {
    fn name(&self) -> String {
        self.hostport.clone()
    }

    fn kind(&self) -> &'static str {
        TcpConf::KIND
    }

    async fn probe(&self, timeout_duration: Duration) -> (bool, Duration) {
        let start = Instant::now();

        match timeout(timeout_duration, TcpStream::connect(&self.hostport)).await {
            Ok(Ok(_)) => (true, start.elapsed()),
            Ok(Err(e)) => {
                debug!(hostport = %self.hostport, error = %e, "TCP connection failed");
                (false, start.elapsed())
            }
            Err(_) => {
                debug!(hostport = %self.hostport, "TCP connection timeout");
                (false, start.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio::net::TcpListener;

    fn conf(hostport: &str) -> TcpConf {
        TcpConf { hostport: hostport.to_string() }
    }

    #[test]
    fn test_validate_hostport() {
        assert!(conf("example.com:80").validate().is_ok());
        assert!(conf("[::1]:443").validate().is_ok());

        assert!(conf("example.com").validate().is_err());
        assert!(conf("example.com:").validate().is_err());
        assert!(conf(":80").validate().is_err());
        assert!(conf("example.com:0").validate().is_err());
        assert!(conf("example.com:70000").validate().is_err());
    }

    #[test]
    fn test_parse_missing_hostport() {
        let settings = json!({"host": "example.com"}).as_object().cloned().unwrap();
        assert!(TcpConf::default().parse(&settings).is_err());
    }

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let prober = Box::new(conf(&addr.to_string())).into_prober();
        let (ok, _) = prober.probe(Duration::from_secs(5)).await;
        assert!(ok);
        assert_eq!(prober.name(), addr.to_string());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = Box::new(conf(&addr.to_string())).into_prober();
        let (ok, _) = prober.probe(Duration::from_secs(5)).await;
        assert!(!ok);
    }
}
