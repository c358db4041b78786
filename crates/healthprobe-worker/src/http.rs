//! HTTP and HTTPS probe executors.
//!
//! Each probe opens a fresh connection, sends one `GET`, reads the response
//! head (or, when 1xx responses are ignored, the first interim one) and
//! drops the connection. The whole exchange (connect, TLS
//! handshake, request, response head) runs under the check's timeout.

use std::net::SocketAddr;
use std::sync::Mutex;

use bytes::Bytes;
use healthprobe_core::{HealthCheckJob, HealthResult, HttpCheck};
use http::header::{HOST, USER_AGENT};
use http::{Method, Request, StatusCode};
use http_body_util::Empty;
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::classifier::{classify, Verdict};
use crate::error::{ProbeError, ProbeResult};
use crate::tls::ProbeTlsConfig;

/// Probe `http://addr/path`.
pub async fn http_probe(
    job: &HealthCheckJob,
    check: &HttpCheck,
    addr: SocketAddr,
    user_agent: &str,
) -> ProbeResult<Option<HealthResult>> {
    let path = check.normalized_path();
    debug!(url = %format!("http://{addr}{path}"), "sending HTTP health probe");

    let exchange = async {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ProbeError::from_connect(e, check.timeout))?;
        get(stream, addr, &path, user_agent, check.ignore_http1xx).await
    };

    let status = with_timeout(check, exchange).await?;
    Ok(judge(job, check, status))
}

/// Probe `https://addr/path` using the relaxed probe TLS config.
pub async fn https_probe(
    job: &HealthCheckJob,
    check: &HttpCheck,
    addr: SocketAddr,
    tls: &ProbeTlsConfig,
    user_agent: &str,
) -> ProbeResult<Option<HealthResult>> {
    let path = check.normalized_path();
    debug!(url = %format!("https://{addr}{path}"), "sending HTTPS health probe");

    let exchange = async {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ProbeError::from_connect(e, check.timeout))?;
        let server_name = ServerName::from(addr.ip());
        let stream = tls
            .connector()
            .connect(server_name, stream)
            .await
            .map_err(ProbeError::TlsHandshake)?;
        get(stream, addr, &path, user_agent, check.ignore_http1xx).await
    };

    let status = with_timeout(check, exchange).await?;
    Ok(judge(job, check, status))
}

async fn with_timeout<F>(check: &HttpCheck, exchange: F) -> ProbeResult<StatusCode>
where
    F: std::future::Future<Output = ProbeResult<StatusCode>>,
{
    match tokio::time::timeout(check.timeout, exchange).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(check.timeout)),
    }
}

/// Send one `GET` over `io` and return the response status.
///
/// With `ignore_http1xx` set, the first interim (1xx) response is returned as
/// soon as it arrives instead of waiting for the final one.
async fn get<S>(
    io: S,
    addr: SocketAddr,
    path: &str,
    user_agent: &str,
    ignore_http1xx: bool,
) -> ProbeResult<StatusCode>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(io)).await?;

    // Drive the connection in the background until the probe returns.
    let _driver = ConnectionDriver(tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "health probe connection closed with error");
        }
    }));

    let mut req = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(HOST, addr.to_string())
        .header(USER_AGENT, user_agent)
        .body(Empty::<Bytes>::new())?;

    let Some(interim) = ignore_http1xx.then(|| on_first_informational(&mut req)) else {
        return Ok(sender.send_request(req).await?.status());
    };

    tokio::select! {
        Ok(status) = interim => Ok(status),
        resp = sender.send_request(req) => Ok(resp?.status()),
    }
}

/// Register a hook that reports the status of the first 1xx response.
///
/// The receiver errors without a value if the request completes first.
fn on_first_informational(req: &mut Request<Empty<Bytes>>) -> oneshot::Receiver<StatusCode> {
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    hyper::ext::on_informational(req, move |res| {
        let first = tx.lock().ok().and_then(|mut slot| slot.take());
        if let Some(first) = first {
            // A closed receiver means the final response already won.
            let _ = first.send(res.status());
        }
    });
    rx
}

/// Aborts the connection task on drop, so an unanswered or abandoned
/// exchange releases its socket with the probe.
struct ConnectionDriver(JoinHandle<()>);

impl Drop for ConnectionDriver {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn judge(job: &HealthCheckJob, check: &HttpCheck, status: StatusCode) -> Option<HealthResult> {
    match classify(status.as_u16(), check.ignore_http1xx) {
        Verdict::Healthy => Some(HealthResult::healthy(job)),
        Verdict::Ignore => {
            debug!(instance_id = %job.instance.id, %status, "ignoring informational response");
            None
        }
        Verdict::Unhealthy(cause) => {
            warn!(instance_id = %job.instance.id, %status, "health probe got non-healthy status");
            Some(HealthResult::unhealthy(job, cause))
        }
    }
}
