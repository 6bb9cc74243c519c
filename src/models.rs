//! Core data models for LeakLens

use crate::error::{LeakLensError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A normalized scan target: scheme enforced, no trailing slash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    base: String,
}

impl Target {
    /// Normalizes user input into a target. Inputs without an http(s)
    /// scheme are assumed to be `https://`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LeakLensError::TargetError(input.to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let parsed = url::Url::parse(&with_scheme)?;
        if parsed.host_str().is_none() {
            return Err(LeakLensError::TargetError(input.to_string()));
        }

        Ok(Self {
            base: with_scheme.trim_end_matches('/').to_string(),
        })
    }

    /// The normalized base URL
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Resolves a catalog path against this target
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// The two independent check families run against every target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFamily {
    DebugLog,
    WpConfig,
}

impl fmt::Display for ProbeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFamily::DebugLog => write!(f, "debug_log"),
            ProbeFamily::WpConfig => write!(f, "wp_config"),
        }
    }
}

/// Classification attached to every finding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// Log signal found within the first lines of the body
    ConfirmedLog,
    /// Large 200 response without log signal, needs a human look
    PossibleLog,
    /// Exposed wp-config with WP_DEBUG set to true
    #[serde(rename = "confirmed-config-debug-on")]
    ConfigDebugOn,
    /// Exposed wp-config without debug confirmation
    #[serde(rename = "found-config-file")]
    ConfigFile,
    /// Request failed before a classification could be made
    Error,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::ConfirmedLog => write!(f, "confirmed-log"),
            FindingKind::PossibleLog => write!(f, "possible-log"),
            FindingKind::ConfigDebugOn => write!(f, "confirmed-config-debug-on"),
            FindingKind::ConfigFile => write!(f, "found-config-file"),
            FindingKind::Error => write!(f, "error"),
        }
    }
}

/// A single reportable result of probing one URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique identifier
    pub id: String,
    /// Fully resolved URL that was probed
    pub url: String,
    /// Check family that produced the finding
    pub family: ProbeFamily,
    /// Classification
    pub kind: FindingKind,
    /// HTTP status, 0 when the request never completed
    pub status: u16,
    /// Response size in bytes, if known
    pub size: Option<u64>,
    /// Network or read error
    pub error: Option<String>,
    /// When the finding was produced
    pub found_at: DateTime<Local>,
}

impl Finding {
    /// Creates a classified finding for a completed response
    pub fn new(
        family: ProbeFamily,
        kind: FindingKind,
        url: impl Into<String>,
        status: u16,
        size: Option<u64>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            family,
            kind,
            status,
            size,
            error: None,
            found_at: Local::now(),
        }
    }

    /// Creates an error finding (status 0) for a failed request
    pub fn error(family: ProbeFamily, url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(family, FindingKind::Error, url, 0, None)
        }
    }

    /// Size as rendered in output lines, `-1` when unknown
    pub fn display_size(&self) -> i64 {
        self.size
            .and_then(|s| i64::try_from(s).ok())
            .unwrap_or(-1)
    }

    pub fn is_error(&self) -> bool {
        self.kind == FindingKind::Error
    }
}

/// Configuration for a scan session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Maximum number of targets probed at once
    pub concurrency: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Whether to follow HTTP redirects
    pub follow_redirects: bool,
    /// Capacity of the findings queue
    pub queue_capacity: usize,
    /// Print a console line for every failed request
    pub report_errors: bool,
    /// Append `[FOUND]` lines to this file
    pub output_file: Option<PathBuf>,
    /// Export every finding as JSON lines to this file
    pub jsonl_file: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout_secs: 10,
            user_agent: "LeakLens/0.1.0".to_string(),
            follow_redirects: false,
            queue_capacity: 1000,
            report_errors: false,
            output_file: None,
            jsonl_file: None,
        }
    }
}

/// Result of a complete scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique scan identifier
    pub scan_id: String,
    /// Scan start time (local timezone)
    pub started_at: DateTime<Local>,
    /// Scan end time (local timezone)
    pub finished_at: Option<DateTime<Local>>,
    /// Number of targets admitted by the scheduler
    pub targets_scanned: usize,
    /// Findings drained by the sink, per kind
    pub counts: HashMap<FindingKind, usize>,
    /// Findings drained by the sink in total
    pub total_findings: usize,
    /// `[FOUND]` lines emitted
    pub found_lines: usize,
    /// Total HTTP requests made
    pub total_requests: u64,
    /// Highest number of simultaneous in-flight requests observed
    pub peak_in_flight: usize,
    /// Whether the scan was cut short by a shutdown request
    pub interrupted: bool,
}

impl ScanResult {
    pub fn new() -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            started_at: Local::now(),
            finished_at: None,
            targets_scanned: 0,
            counts: HashMap::new(),
            total_findings: 0,
            found_lines: 0,
            total_requests: 0,
            peak_in_flight: 0,
            interrupted: false,
        }
    }

    /// Returns count of findings of the given kind
    pub fn count(&self, kind: FindingKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Marks the scan as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }
}

impl Default for ScanResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_adds_scheme_and_strips_slash() {
        let target = Target::parse("example.com/").expect("target");
        assert_eq!(target.as_str(), "https://example.com");

        let target = Target::parse("  http://example.com/blog//  ").expect("target");
        assert_eq!(target.as_str(), "http://example.com/blog");
    }

    #[test]
    fn test_target_keeps_hosts_starting_with_http() {
        let target = Target::parse("httpbin.org").expect("target");
        assert_eq!(target.as_str(), "https://httpbin.org");
    }

    #[test]
    fn test_target_join() {
        let target = Target::parse("https://example.com/").expect("target");
        assert_eq!(
            target.join("/wp-content/../debug.log"),
            "https://example.com/wp-content/../debug.log"
        );
    }

    #[test]
    fn test_target_rejects_blank() {
        assert!(Target::parse("   ").is_err());
    }

    #[test]
    fn test_error_finding_has_zero_status() {
        let finding = Finding::error(ProbeFamily::WpConfig, "https://x/wp-config.php", "timeout");
        assert_eq!(finding.status, 0);
        assert_eq!(finding.kind, FindingKind::Error);
        assert_eq!(finding.display_size(), -1);
        assert_eq!(finding.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_finding_kind_serializes_as_tag() {
        let json = serde_json::to_string(&FindingKind::ConfigDebugOn).expect("json");
        assert_eq!(json, "\"confirmed-config-debug-on\"");
        let json = serde_json::to_string(&FindingKind::PossibleLog).expect("json");
        assert_eq!(json, "\"possible-log\"");
    }
}
