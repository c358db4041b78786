//! HTTP status classification shared by the HTTP and HTTPS executors.

use std::ops::Range;

/// Status codes that count as healthy.
pub const HEALTHY_STATUS: Range<u16> = 200..400;

/// Informational status codes that may be ignored instead of judged.
pub const IGNORABLE_STATUS: Range<u16> = 100..200;

/// Verdict for a single HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    /// Carries the cause to report.
    Unhealthy(String),
    /// Produce no result at all.
    Ignore,
}

/// Classify a status code. Pure: same inputs, same verdict.
pub fn classify(status: u16, ignore_http1xx: bool) -> Verdict {
    if HEALTHY_STATUS.contains(&status) {
        Verdict::Healthy
    } else if ignore_http1xx && IGNORABLE_STATUS.contains(&status) {
        Verdict::Ignore
    } else {
        Verdict::Unhealthy(status_text(status))
    }
}

/// "503 Service Unavailable", or just the number for unknown codes.
fn status_text(status: u16) -> String {
    match http::StatusCode::from_u16(status) {
        Ok(code) => code.to_string(),
        Err(_) => status.to_string(),
    }
}
