use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use healthprobe_core::Protocol;

mod commands;

use commands::probe::{self, OutputFormat};

#[derive(Parser)]
#[command(
    name = "healthprobe",
    about = "Run a single health probe against an instance",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Output format for the verdict.
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the job described in a TOML or JSON job file.
    Run {
        /// Path to the job file (.toml, otherwise JSON).
        #[arg(short, long)]
        job: PathBuf,
    },
    /// Probe host:port with a single HTTP(S) GET.
    Http {
        #[arg(long)]
        host: IpAddr,
        #[arg(long)]
        port: u16,
        /// Request path (a leading "/" is added if missing).
        #[arg(long)]
        path: Option<String>,
        /// Use HTTPS. Certificates are not verified.
        #[arg(long)]
        https: bool,
        /// Deadline such as "2s" or "500ms".
        #[arg(long, default_value = "2s", value_parser = parse_timeout)]
        timeout: Duration,
        /// Report nothing for 1xx responses instead of unhealthy.
        #[arg(long = "ignore-1xx")]
        ignore_http1xx: bool,
    },
    /// Probe host:port with a single TCP connect.
    Tcp {
        #[arg(long)]
        host: IpAddr,
        #[arg(long)]
        port: u16,
        /// Deadline such as "2s" or "500ms".
        #[arg(long, default_value = "2s", value_parser = parse_timeout)]
        timeout: Duration,
    },
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    healthprobe_core::duration::parse_duration(s).ok_or_else(|| format!("invalid duration: {s:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "warn,healthprobe=info,healthprobe_worker=info",
                )
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { job } => probe::run_file(&job, cli.format).await,
        Commands::Http {
            host,
            port,
            path,
            https,
            timeout,
            ignore_http1xx,
        } => {
            let protocol = if https { Protocol::Https } else { Protocol::Http };
            let check = probe::http_check(path, protocol, port, timeout, ignore_http1xx);
            probe::run_adhoc(host, port, check, cli.format).await
        }
        Commands::Tcp {
            host,
            port,
            timeout,
        } => {
            let check = probe::tcp_check(port, timeout);
            probe::run_adhoc(host, port, check, cli.format).await
        }
    }
}
