//! TCP connect probe.
//!
//! Opens a socket with a blocking `connect_timeout` on tokio's blocking pool,
//! closes it straight away and reports `Healthy` if the connect succeeded.

use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use healthprobe_core::{HealthCheckJob, HealthResult, TcpCheck};
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};

pub async fn tcp_probe(
    job: &HealthCheckJob,
    check: &TcpCheck,
    addr: SocketAddr,
) -> ProbeResult<Option<HealthResult>> {
    // Whole milliseconds only.
    let timeout = Duration::from_millis(check.timeout.as_millis() as u64);
    debug!(%addr, timeout_ms = timeout.as_millis() as u64, "sending TCP health probe");

    tokio::task::spawn_blocking(move || connect(addr, timeout))
        .await
        .map_err(ProbeError::from_join)??;

    Ok(Some(HealthResult::healthy(job)))
}

fn connect(addr: SocketAddr, timeout: Duration) -> ProbeResult<()> {
    let stream =
        TcpStream::connect_timeout(&addr, timeout).map_err(|e| ProbeError::from_connect(e, timeout))?;
    // The connect alone decides the verdict.
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        debug!(%addr, error = %e, "TCP health probe socket shutdown failed");
    }
    Ok(())
}
