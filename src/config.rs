//! Configuration management for LeakLens

use crate::error::{LeakLensError, Result};
use crate::models::ScanConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File-based configuration structure matching default.toml
#[derive(Debug, Deserialize)]
struct FileConfig {
    scan: Option<ScanSection>,
    output: Option<OutputSection>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    follow_redirects: Option<bool>,
    queue_capacity: Option<usize>,
    report_errors: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
    file: Option<PathBuf>,
    jsonl: Option<PathBuf>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path).map_err(LeakLensError::IoError)?;
    parse_config(&content)
}

/// Parses TOML configuration text on top of the defaults
pub fn parse_config(content: &str) -> Result<ScanConfig> {
    let file_config: FileConfig = toml::from_str(content)?;

    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(concurrency) = scan.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = scan.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(ua) = scan.user_agent {
            config.user_agent = ua;
        }
        if let Some(follow) = scan.follow_redirects {
            config.follow_redirects = follow;
        }
        if let Some(capacity) = scan.queue_capacity {
            config.queue_capacity = capacity;
        }
        if let Some(report) = scan.report_errors {
            config.report_errors = report;
        }
    }

    if let Some(output) = file_config.output {
        config.output_file = output.file;
        config.jsonl_file = output.jsonl;
    }

    validate(&config)?;
    Ok(config)
}

/// Merges CLI arguments into an existing ScanConfig
pub fn merge_cli_args(
    config: &mut ScanConfig,
    concurrency: Option<usize>,
    timeout: Option<u64>,
    output: Option<PathBuf>,
    jsonl: Option<PathBuf>,
    report_errors: bool,
) -> Result<()> {
    if let Some(c) = concurrency {
        config.concurrency = c;
    }
    if let Some(t) = timeout {
        config.timeout_secs = t;
    }
    if let Some(o) = output {
        config.output_file = Some(o);
    }
    if let Some(j) = jsonl {
        config.jsonl_file = Some(j);
    }
    if report_errors {
        config.report_errors = true;
    }
    validate(config)
}

fn validate(config: &ScanConfig) -> Result<()> {
    if config.concurrency == 0 {
        return Err(LeakLensError::ConfigError(
            "concurrency must be at least 1".to_string(),
        ));
    }
    if config.queue_capacity == 0 {
        return Err(LeakLensError::ConfigError(
            "queue_capacity must be at least 1".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(LeakLensError::ConfigError(
            "timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}
