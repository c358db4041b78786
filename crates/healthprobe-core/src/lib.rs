//! healthprobe-core — data model for one-shot health probes.
//!
//! Defines the job a scheduler hands to a probe worker, the check
//! definitions it may carry, and the results a worker reports back.
//!
//! # Architecture
//!
//! ```text
//! HealthCheckJob
//!   ├── RunSpecRef (id, version)
//!   ├── Instance (id, effective_ip?, host_ports)
//!   └── CheckDefinition
//!       ├── Http(HttpCheck)  path, protocol, port, timeout, ignore_http1xx
//!       └── Tcp(TcpCheck)    port, timeout
//!
//! HealthResult = Healthy | Unhealthy   (no result = Option::None)
//! ```
//!
//! Jobs can also be loaded from TOML or JSON files via [`JobFile`].

pub mod config;
pub mod duration;
pub mod types;

pub use config::{JobFile, ProbeSettings};
pub use types::*;
