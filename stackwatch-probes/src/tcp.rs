//! TCP reachability probe.
//!
//! Answers one question: can a TCP connection to `host:port` be opened
//! within a bounded time. A refused or reset connection and an elapsed
//! timeout both resolve to `Ok(false)`; the error path is reserved for
//! targets that cannot be checked at all (unresolvable host, malformed
//! address).

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::{Probe, ProbeError};

/// Default connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Probe that checks whether a TCP connection to a service can be opened.
///
/// # Example
///
/// ```rust,no_run
/// use stackwatch_probes::TcpProbe;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let probe = TcpProbe::new("localhost", 5432).with_timeout(Duration::from_secs(1));
/// let reachable = probe.check().await.unwrap();
/// # let _ = reachable;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe for `host:port` with the default timeout.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the connect timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured timeout bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attempt to open and close one connection within the timeout.
    ///
    /// Never blocks past the configured timeout: an attempt still pending
    /// when the bound elapses counts as unreachable, not as a failure.
    pub async fn check(&self) -> Result<bool, ProbeError> {
        let addr = format!("{}:{}", self.host, self.port);

        match tokio::time::timeout(self.timeout, TcpStream::connect(&addr)).await {
            // Connection opened; dropping the stream closes it.
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(err)) => classify_connect_error(err),
            // Nothing answered within the bound.
            Err(_elapsed) => Ok(false),
        }
    }
}

/// Split connect errors into "checked and not reachable" and "could not
/// check". Refusals and resets mean a working stack told us no; anything
/// else (resolution failure, bad address) is a probe-infrastructure error.
fn classify_connect_error(err: io::Error) -> Result<bool, ProbeError> {
    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::TimedOut => Ok(false),
        _ => Err(ProbeError::InvalidTarget(err.to_string())),
    }
}

#[async_trait]
impl Probe for TcpProbe {
    type Output = bool;

    async fn run(&self) -> Result<bool, ProbeError> {
        self.check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new("127.0.0.1", port);
        assert_eq!(probe.check().await.unwrap(), true);
    }

    #[tokio::test]
    async fn dead_port_is_unreachable_not_an_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = TcpProbe::new("127.0.0.1", port);
        assert_eq!(probe.check().await.unwrap(), false);
    }

    #[tokio::test]
    async fn check_completes_within_timeout_bound() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let timeout = Duration::from_secs(2);
        let probe = TcpProbe::new("127.0.0.1", port).with_timeout(timeout);

        let started = Instant::now();
        let result = probe.check().await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(result, false);
        // Allow generous scheduling slack on top of the bound.
        assert!(elapsed < timeout + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_probe_failure() {
        let probe = TcpProbe::new("host.invalid.stackwatch.test", 80);
        let err = probe.check().await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidTarget(_)));
    }

    #[test]
    fn default_timeout_is_a_few_seconds() {
        let probe = TcpProbe::new("127.0.0.1", 1);
        assert_eq!(probe.timeout(), DEFAULT_TIMEOUT);
    }
}
