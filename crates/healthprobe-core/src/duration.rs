//! Human-readable durations ("2s", "500ms", "1m", "900us") for job files.
//!
//! Used as `#[serde(with = "crate::duration")]` on `Duration` fields.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is taken as seconds. `us` and `ns` keep sub-millisecond
/// values exact. Values that overflow are rejected.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let number = |n: &str| n.trim().parse::<u64>().ok();
    if let Some(ms) = s.strip_suffix("ms") {
        number(ms).map(Duration::from_millis)
    } else if let Some(us) = s.strip_suffix("us") {
        number(us).map(Duration::from_micros)
    } else if let Some(ns) = s.strip_suffix("ns") {
        number(ns).map(Duration::from_nanos)
    } else if let Some(secs) = s.strip_suffix('s') {
        number(secs).map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        number(mins)
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        number(s).map(Duration::from_secs)
    }
}

/// Render a duration in the shortest exact form `parse_duration` accepts.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos % 1_000_000_000 == 0 {
        format!("{}s", d.as_secs())
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", d.as_millis())
    } else if nanos % 1_000 == 0 {
        format!("{}us", d.as_micros())
    } else {
        format!("{nanos}ns")
    }
}

pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*d))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_duration(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {s:?}")))
}
