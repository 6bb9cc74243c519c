//! Common test utilities

#![allow(dead_code)]

use leaklens::models::{Finding, ScanConfig};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Scan configuration suitable for talking to a local wiremock server
pub fn test_config() -> ScanConfig {
    ScanConfig {
        concurrency: 2,
        timeout_secs: 10,
        user_agent: "LeakLens-Test/0.1.0".to_string(),
        ..ScanConfig::default()
    }
}

/// A unique path under the system temp directory
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("leaklens-{}-{name}", uuid::Uuid::new_v4()))
}

/// An address nothing listens on
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Collects everything left in a closed findings queue
pub async fn collect(mut rx: mpsc::Receiver<Finding>) -> Vec<Finding> {
    let mut findings = Vec::new();
    while let Some(finding) = rx.recv().await {
        findings.push(finding);
    }
    findings
}

/// Reads back a JSONL findings file in line order
pub fn read_jsonl(path: &Path) -> Vec<Finding> {
    std::fs::read_to_string(path)
        .expect("jsonl file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid finding"))
        .collect()
}
