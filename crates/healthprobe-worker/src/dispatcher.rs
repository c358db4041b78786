//! Job dispatch: resolve the target address and pick the executor.

use std::future::Future;
use std::net::SocketAddr;

use healthprobe_core::{CheckDefinition, HealthCheckJob, HealthResult, ProbeSettings, Protocol};
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::http::{http_probe, https_probe};
use crate::tcp::tcp_probe;
use crate::tls::ProbeTlsConfig;

/// Turns a job into a probe outcome.
///
/// `Ok(None)` is a legal outcome: the response must not be judged.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(
        &self,
        job: &HealthCheckJob,
    ) -> impl Future<Output = ProbeResult<Option<HealthResult>>> + Send;
}

/// Routes a job to the HTTP, HTTPS or TCP executor.
///
/// Cheap to clone; holds no per-job state.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tls: ProbeTlsConfig,
    settings: ProbeSettings,
}

impl Dispatcher {
    pub fn new(tls: ProbeTlsConfig, settings: ProbeSettings) -> Self {
        Self { tls, settings }
    }

    /// Dispatcher with the relaxed probe TLS config and default settings.
    pub fn with_defaults() -> ProbeResult<Self> {
        Ok(Self::new(ProbeTlsConfig::relaxed()?, ProbeSettings::default()))
    }
}

impl Dispatch for Dispatcher {
    /// Resolve the job's `ip:port` and run the matching executor.
    async fn dispatch(&self, job: &HealthCheckJob) -> ProbeResult<Option<HealthResult>> {
        let addr = resolve(job)?;
        debug!(instance_id = %job.instance.id, %addr, "dispatching health check");

        match &job.check {
            CheckDefinition::Http(check) => match check.protocol {
                Protocol::Http => http_probe(job, check, addr, &self.settings.user_agent).await,
                Protocol::Https => {
                    https_probe(job, check, addr, &self.tls, &self.settings.user_agent).await
                }
                other @ (Protocol::Tcp | Protocol::Command) => {
                    Err(ProbeError::UnsupportedProtocol(other))
                }
            },
            CheckDefinition::Tcp(check) => tcp_probe(job, check, addr).await,
        }
    }
}

/// Effective `ip:port` of the job's instance.
pub fn resolve(job: &HealthCheckJob) -> ProbeResult<SocketAddr> {
    let ip = job
        .instance
        .effective_ip()
        .ok_or_else(|| ProbeError::UnresolvedAddress(job.instance.id.clone()))?;
    let port = job
        .check
        .effective_port(&job.instance)
        .ok_or_else(|| ProbeError::UnresolvedPort(job.instance.id.clone()))?;
    Ok(SocketAddr::new(ip, port))
}
