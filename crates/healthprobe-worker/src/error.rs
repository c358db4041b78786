//! Error types for probe execution.
//!
//! Every error is turned into an `Unhealthy` result at the worker boundary.
//! [`ProbeError::diagnostic`] renders the `"<kind>: <message>"` cause.

use std::time::Duration;

use healthprobe_core::{InstanceId, Protocol};
use thiserror::Error;
use tokio::task::JoinError;

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while dispatching or executing a probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("instance {0} has no effective IP address")]
    UnresolvedAddress(InstanceId),

    #[error("instance {0} has no port for this health check")]
    UnresolvedPort(InstanceId),

    #[error("health check protocol {0} is not supported for HTTP checks")]
    UnsupportedProtocol(Protocol),

    #[error("{0}")]
    Connect(#[source] std::io::Error),

    #[error("{0}")]
    TlsHandshake(#[source] std::io::Error),

    #[error("{0}")]
    Http(#[from] hyper::Error),

    #[error("{0}")]
    InvalidRequest(#[from] http::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("probe task panicked: {0}")]
    WorkerPanic(String),

    #[error("probe task was cancelled")]
    Cancelled,

    #[error("failed to build probe TLS config: {0}")]
    TlsConfig(#[from] rustls::Error),
}

impl ProbeError {
    /// Short name of the failure class.
    pub fn kind(&self) -> String {
        match self {
            ProbeError::UnresolvedAddress(_) => "UnresolvedAddress".to_string(),
            ProbeError::UnresolvedPort(_) => "UnresolvedPort".to_string(),
            ProbeError::UnsupportedProtocol(_) => "UnsupportedProtocol".to_string(),
            ProbeError::Connect(e) => format!("{:?}", e.kind()),
            ProbeError::TlsHandshake(_) => "TlsHandshake".to_string(),
            ProbeError::Http(_) => "HttpProtocol".to_string(),
            ProbeError::InvalidRequest(_) => "InvalidRequest".to_string(),
            ProbeError::Timeout(_) => "Timeout".to_string(),
            ProbeError::WorkerPanic(_) => "WorkerPanic".to_string(),
            ProbeError::Cancelled => "Cancelled".to_string(),
            ProbeError::TlsConfig(_) => "TlsConfig".to_string(),
        }
    }

    /// Cause string reported in an `Unhealthy` result.
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }

    /// Map a connect error, keeping timeouts distinct.
    pub(crate) fn from_connect(err: std::io::Error, timeout: Duration) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                ProbeError::Timeout(timeout)
            }
            _ => ProbeError::Connect(err),
        }
    }

    /// Map a failed join on a probe task: a panic or a cancellation.
    pub(crate) fn from_join(err: JoinError) -> Self {
        if !err.is_panic() {
            return ProbeError::Cancelled;
        }
        let payload = err.into_panic();
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        ProbeError::WorkerPanic(message)
    }
}
