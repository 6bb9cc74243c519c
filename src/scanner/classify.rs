//! Content classifiers for probed responses

use crate::models::FindingKind;

/// Case-sensitive substrings that mark a body as a genuine log
pub const LOG_SIGNALS: &[&str] = &[
    "PHP",
    "DEBUG",
    "ERROR",
    "Warning",
    "Notice",
    "Fatal",
    "Stack trace",
];

/// Number of leading lines inspected for a log signal
pub const LOG_LINE_BUDGET: usize = 5;

/// Responses at or below this size without a signal are treated as soft 404s
pub const MIN_REPORTABLE_SIZE: u64 = 100;

const DEBUG_MARKER: &str = "WP_DEBUG";

/// Returns true if any of the first [`LOG_LINE_BUDGET`] lines carries a log signal
pub fn has_log_signal(body_head: &str) -> bool {
    body_head
        .lines()
        .take(LOG_LINE_BUDGET)
        .any(|line| LOG_SIGNALS.iter().any(|signal| line.contains(signal)))
}

/// Classifies a 200 response to a log path
pub fn classify_log(body_head: &str, size: Option<u64>) -> Option<FindingKind> {
    if has_log_signal(body_head) {
        Some(FindingKind::ConfirmedLog)
    } else if exceeds_min_size(size) {
        Some(FindingKind::PossibleLog)
    } else {
        None
    }
}

/// A line enabling debug mode: mentions `WP_DEBUG` and `true` in any case
pub fn is_debug_enabled_line(line: &str) -> bool {
    line.contains(DEBUG_MARKER) && line.to_ascii_lowercase().contains("true")
}

/// Classifies a 200 response to a config path
pub fn classify_config(body: &str, size: Option<u64>) -> Option<FindingKind> {
    if body.lines().any(is_debug_enabled_line) {
        Some(FindingKind::ConfigDebugOn)
    } else if exceeds_min_size(size) {
        Some(FindingKind::ConfigFile)
    } else {
        None
    }
}

fn exceeds_min_size(size: Option<u64>) -> bool {
    size.is_some_and(|s| s > MIN_REPORTABLE_SIZE)
}
