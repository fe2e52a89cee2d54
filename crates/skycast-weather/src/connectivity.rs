//! Connectivity probing.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Answers "is the device online right now".
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Treats the device as online when a TCP connection to `host:port` opens
/// within the timeout.
#[derive(Debug, Clone)]
pub struct TcpReachabilityProbe {
    address: String,
    timeout: Duration,
}

impl TcpReachabilityProbe {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            address: format!("{}:{}", host, port),
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ConnectivityProbe for TcpReachabilityProbe {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!("Reachability probe to {} failed: {}", self.address, e);
                false
            }
            Err(_) => {
                tracing::debug!("Reachability probe to {} timed out", self.address);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_port_is_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpReachabilityProbe::new("127.0.0.1", port);
        assert!(probe.is_online().await);
    }

    #[tokio::test]
    async fn test_closed_port_is_offline() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = TcpReachabilityProbe::new("127.0.0.1", port)
            .with_timeout(Duration::from_millis(500));
        assert!(!probe.is_online().await);
    }
}
