//! healthprobe-worker — one-shot health probe execution.
//!
//! Takes a [`HealthCheckJob`](healthprobe_core::HealthCheckJob), performs
//! exactly one HTTP GET, HTTPS GET or TCP connect against the instance,
//! classifies the outcome and reports it.
//!
//! # Architecture
//!
//! ```text
//! HealthCheckWorker (one job, then done)
//!   └── Dispatcher::dispatch()
//!       ├── resolve effective ip:port
//!       ├── HTTP  → http_probe()  ─┐
//!       ├── HTTPS → https_probe() ─┴─▶ classifier::classify()
//!       │             └── ProbeTlsConfig (accepts any certificate)
//!       └── TCP   → tcp_probe()  (blocking connect on the blocking pool)
//! ```
//!
//! # Results
//!
//! - `Some(Healthy)` for status 200–399 or a successful connect.
//! - `None` for a 1xx response when the check ignores them.
//! - `Some(Unhealthy)` for anything else. Errors become `Unhealthy` with a
//!   `"<kind>: <message>"` cause at the worker boundary.
//!
//! No retries happen here; scheduling and retry cadence belong to the caller.

pub mod classifier;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod tcp;
pub mod tls;
pub mod worker;

pub use classifier::{classify, Verdict, HEALTHY_STATUS, IGNORABLE_STATUS};
pub use dispatcher::{Dispatch, Dispatcher};
pub use error::{ProbeError, ProbeResult};
pub use tls::ProbeTlsConfig;
pub use worker::{run_job, HealthCheckWorker, WorkerState};
