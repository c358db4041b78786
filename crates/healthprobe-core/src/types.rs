//! Domain types for health probe jobs.
//!
//! A [`HealthCheckJob`] is created by a scheduler, consumed exactly once by a
//! worker and then discarded. Everything a probe needs (address, port,
//! protocol, timeout) travels inside the job.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an instance of a run spec.
pub type InstanceId = String;

/// Version of the run spec an instance was launched from.
pub type RunSpecVersion = String;

// ── Job ───────────────────────────────────────────────────────────

/// A single probe request: which instance to check and how.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCheckJob {
    pub run_spec: RunSpecRef,
    pub instance: Instance,
    pub check: CheckDefinition,
}

/// Reference to the app (or pod) definition the instance belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpecRef {
    pub id: String,
    pub version: RunSpecVersion,
}

// ── Instance ──────────────────────────────────────────────────────

/// The probed instance, as seen by the scheduler at job creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instance {
    pub id: InstanceId,
    /// Address the instance is reachable on. `None` until the instance is
    /// network-ready.
    #[serde(default)]
    pub effective_ip: Option<IpAddr>,
    /// Host ports allocated to the instance, in port-definition order.
    #[serde(default)]
    pub host_ports: Vec<u16>,
}

impl Instance {
    pub fn effective_ip(&self) -> Option<IpAddr> {
        self.effective_ip
    }
}

// ── Check definitions ─────────────────────────────────────────────

/// How a health check finds the port to probe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PortReference {
    /// Index into the instance's `host_ports`.
    Index(usize),
    /// A fixed port number.
    Port(u16),
}

impl Default for PortReference {
    fn default() -> Self {
        PortReference::Index(0)
    }
}

/// Protocols a health check definition may declare.
///
/// Only `Http` and `Https` are valid for an [`HttpCheck`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Http,
    Https,
    Tcp,
    Command,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Tcp => "TCP",
            Protocol::Command => "COMMAND",
        };
        f.write_str(name)
    }
}

/// What to probe. Closed set: adding a protocol is a compile-time change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckDefinition {
    Http(HttpCheck),
    Tcp(TcpCheck),
}

/// HTTP or HTTPS GET probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpCheck {
    /// Request path. `None` means `/`.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub port: PortReference,
    /// Deadline for the whole exchange (connect, handshake, response head).
    #[serde(with = "crate::duration", default = "default_timeout")]
    pub timeout: Duration,
    /// Informational (1xx) responses produce no result instead of `Unhealthy`.
    #[serde(default)]
    pub ignore_http1xx: bool,
}

/// TCP connect probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TcpCheck {
    #[serde(default)]
    pub port: PortReference,
    #[serde(with = "crate::duration", default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

impl CheckDefinition {
    /// The check's deadline.
    pub fn timeout(&self) -> Duration {
        match self {
            CheckDefinition::Http(check) => check.timeout,
            CheckDefinition::Tcp(check) => check.timeout,
        }
    }

    /// Port to probe on the given instance, if it can be determined.
    pub fn effective_port(&self, instance: &Instance) -> Option<u16> {
        let port = match self {
            CheckDefinition::Http(check) => check.port,
            CheckDefinition::Tcp(check) => check.port,
        };
        match port {
            PortReference::Port(port) => Some(port),
            PortReference::Index(index) => instance.host_ports.get(index).copied(),
        }
    }
}

impl HttpCheck {
    /// Request path, always starting with `/`.
    pub fn normalized_path(&self) -> String {
        match self.path.as_deref() {
            None | Some("") => "/".to_string(),
            Some(path) if path.starts_with('/') => path.to_string(),
            Some(path) => format!("/{path}"),
        }
    }
}

// ── Results ───────────────────────────────────────────────────────

/// Outcome of one probe. "No result" is modelled as `Option::None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum HealthResult {
    Healthy {
        instance_id: InstanceId,
        version: RunSpecVersion,
        #[serde(default)]
        time: Option<DateTime<Utc>>,
    },
    Unhealthy {
        instance_id: InstanceId,
        version: RunSpecVersion,
        cause: String,
    },
}

impl HealthResult {
    /// A healthy result stamped with the current time.
    pub fn healthy(job: &HealthCheckJob) -> Self {
        HealthResult::Healthy {
            instance_id: job.instance.id.clone(),
            version: job.run_spec.version.clone(),
            time: Some(Utc::now()),
        }
    }

    pub fn unhealthy(job: &HealthCheckJob, cause: impl Into<String>) -> Self {
        HealthResult::Unhealthy {
            instance_id: job.instance.id.clone(),
            version: job.run_spec.version.clone(),
            cause: cause.into(),
        }
    }

    pub fn instance_id(&self) -> &str {
        match self {
            HealthResult::Healthy { instance_id, .. } => instance_id,
            HealthResult::Unhealthy { instance_id, .. } => instance_id,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthResult::Healthy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(ports: Vec<u16>) -> Instance {
        Instance {
            id: "app.inst-1".to_string(),
            effective_ip: Some("10.0.0.1".parse().unwrap()),
            host_ports: ports,
        }
    }

    fn http_check(path: Option<&str>) -> HttpCheck {
        HttpCheck {
            path: path.map(str::to_string),
            protocol: Protocol::Http,
            port: PortReference::Port(9090),
            timeout: Duration::from_secs(2),
            ignore_http1xx: false,
        }
    }

    #[test]
    fn path_without_leading_slash_is_normalized() {
        assert_eq!(http_check(Some("metrics")).normalized_path(), "/metrics");
    }

    #[test]
    fn path_defaults_to_root() {
        assert_eq!(http_check(None).normalized_path(), "/");
        assert_eq!(http_check(Some("")).normalized_path(), "/");
    }

    #[test]
    fn path_with_leading_slash_is_kept() {
        assert_eq!(http_check(Some("/health")).normalized_path(), "/health");
    }

    #[test]
    fn effective_port_from_index() {
        let check = CheckDefinition::Tcp(TcpCheck {
            port: PortReference::Index(1),
            timeout: Duration::from_secs(1),
        });
        assert_eq!(check.effective_port(&instance(vec![31000, 31001])), Some(31001));
        assert_eq!(check.effective_port(&instance(vec![31000])), None);
    }

    #[test]
    fn effective_port_fixed() {
        let check = CheckDefinition::Http(http_check(None));
        assert_eq!(check.effective_port(&instance(vec![])), Some(9090));
    }

    #[test]
    fn protocol_display_matches_wire_name() {
        assert_eq!(Protocol::Command.to_string(), "COMMAND");
        let json = serde_json::to_string(&Protocol::Https).unwrap();
        assert_eq!(json, "\"HTTPS\"");
    }

    #[test]
    fn check_definition_json_roundtrip() {
        let json = r#"{"type":"http","path":"ping","protocol":"HTTPS","port":{"port":8443},"timeout":"500ms","ignore_http1xx":true}"#;
        let check: CheckDefinition = serde_json::from_str(json).unwrap();
        match &check {
            CheckDefinition::Http(http) => {
                assert_eq!(http.protocol, Protocol::Https);
                assert_eq!(http.timeout, Duration::from_millis(500));
                assert!(http.ignore_http1xx);
            }
            other => panic!("expected http check, got {other:?}"),
        }
    }

    #[test]
    fn tcp_check_defaults() {
        let check: CheckDefinition = serde_json::from_str(r#"{"type":"tcp"}"#).unwrap();
        assert_eq!(check.timeout(), Duration::from_secs(20));
        assert_eq!(
            check,
            CheckDefinition::Tcp(TcpCheck {
                port: PortReference::Index(0),
                timeout: Duration::from_secs(20),
            })
        );
    }

    #[test]
    fn result_serializes_with_tag() {
        let result = HealthResult::Unhealthy {
            instance_id: "i-1".to_string(),
            version: "v1".to_string(),
            cause: "503 Service Unavailable".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["result"], "unhealthy");
        assert_eq!(json["cause"], "503 Service Unavailable");
        assert!(!result.is_healthy());
        assert_eq!(result.instance_id(), "i-1");
    }
}
