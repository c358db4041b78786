//! Job file parser and process-wide probe settings.
//!
//! A job file is TOML (`.toml`) or JSON (anything else):
//!
//! ```toml
//! [run_spec]
//! id = "/prod/api"
//! version = "2026-10-01T12:00:00Z"
//!
//! [instance]
//! id = "prod_api.instance-1"
//! effective_ip = "10.0.0.1"
//! host_ports = [9090]
//!
//! [check]
//! type = "http"
//! path = "metrics"
//! timeout = "2s"
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::HealthCheckJob;

/// Settings shared by every probe in the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeSettings {
    /// Value of the `User-Agent` header on HTTP(S) probes.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("healthprobe/", env!("CARGO_PKG_VERSION")).to_string()
}

/// A job as read from disk, with optional settings overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobFile {
    #[serde(flatten)]
    pub job: HealthCheckJob,
    #[serde(default)]
    pub settings: ProbeSettings,
}

impl JobFile {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading job file {}", path.display()))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let parsed = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        parsed.with_context(|| format!("parsing job file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
