use std::net::IpAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use healthprobe_core::*;
use healthprobe_worker::{Dispatcher, HealthCheckWorker, ProbeTlsConfig};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub async fn run_file(path: &Path, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let file = JobFile::from_file(path)?;
    info!(job = %path.display(), instance_id = %file.job.instance.id, "loaded job file");
    run(file.job, file.settings, format).await
}

pub async fn run_adhoc(
    host: IpAddr,
    port: u16,
    check: CheckDefinition,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    run(adhoc_job(host, port, check), ProbeSettings::default(), format).await
}

async fn run(
    job: HealthCheckJob,
    settings: ProbeSettings,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let dispatcher = Dispatcher::new(ProbeTlsConfig::relaxed()?, settings);
    let worker = HealthCheckWorker::new(Arc::new(dispatcher));

    let instance_id = job.instance.id.clone();
    let (tx, mut rx) = mpsc::channel(1);
    worker.spawn(job, tx).await?;
    let result = rx.recv().await;

    println!("{}", render(&instance_id, result.as_ref(), format)?);
    Ok(if is_failure(result.as_ref()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// A job for a bare `host:port`, outside any run spec.
pub fn adhoc_job(host: IpAddr, port: u16, check: CheckDefinition) -> HealthCheckJob {
    HealthCheckJob {
        run_spec: RunSpecRef {
            id: "adhoc".to_string(),
            version: "adhoc".to_string(),
        },
        instance: Instance {
            id: std::net::SocketAddr::new(host, port).to_string(),
            effective_ip: Some(host),
            host_ports: vec![port],
        },
        check,
    }
}

pub fn http_check(
    path: Option<String>,
    protocol: Protocol,
    port: u16,
    timeout: Duration,
    ignore_http1xx: bool,
) -> CheckDefinition {
    CheckDefinition::Http(HttpCheck {
        path,
        protocol,
        port: PortReference::Port(port),
        timeout,
        ignore_http1xx,
    })
}

pub fn tcp_check(port: u16, timeout: Duration) -> CheckDefinition {
    CheckDefinition::Tcp(TcpCheck {
        port: PortReference::Port(port),
        timeout,
    })
}

pub fn is_failure(result: Option<&HealthResult>) -> bool {
    matches!(result, Some(HealthResult::Unhealthy { .. }))
}

pub fn render(
    instance_id: &str,
    result: Option<&HealthResult>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let out = match (format, result) {
        (OutputFormat::Json, Some(result)) => serde_json::to_string(result)?,
        (OutputFormat::Json, None) => {
            serde_json::json!({ "result": "ignored", "instance_id": instance_id }).to_string()
        }
        (OutputFormat::Text, Some(HealthResult::Healthy { version, time, .. })) => match time {
            Some(time) => format!("healthy {instance_id} ({version}) at {}", time.to_rfc3339()),
            None => format!("healthy {instance_id} ({version})"),
        },
        (OutputFormat::Text, Some(HealthResult::Unhealthy { version, cause, .. })) => {
            format!("unhealthy {instance_id} ({version}): {cause}")
        }
        (OutputFormat::Text, None) => format!("ignored {instance_id}: informational response"),
    };
    Ok(out)
}
