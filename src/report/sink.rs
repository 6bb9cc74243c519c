//! Result sink: the single consumer of the findings queue

use super::jsonl::JsonlWriter;
use crate::error::Result;
use crate::models::{Finding, FindingKind, ScanConfig};
use colored::Colorize;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use tokio::sync::mpsc;
use tracing::{error, info};

/// What the sink saw by the time the queue closed. Findings themselves are
/// written out as they arrive and not kept.
#[derive(Debug, Default)]
pub struct SinkReport {
    /// Findings received per kind
    pub counts: HashMap<FindingKind, usize>,
    /// Findings received in total
    pub total: usize,
    /// Number of `[FOUND]` lines emitted
    pub found_lines: usize,
}

impl SinkReport {
    pub fn count(&self, kind: FindingKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    fn record(&mut self, kind: FindingKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.total += 1;
    }
}

/// Renders findings to the console, mirrors `[FOUND]` lines to the optional
/// output file and streams every finding to the optional JSONL file.
/// Nothing is filtered, reordered, or deduplicated.
pub struct ResultSink {
    output: Option<BufWriter<File>>,
    jsonl: Option<JsonlWriter>,
    report_errors: bool,
    progress: ProgressBar,
}

impl ResultSink {
    /// Opens the output file in append mode, creating it if needed, and
    /// creates the JSONL file
    pub fn new(config: &ScanConfig, progress: ProgressBar) -> Result<Self> {
        let output = match config.output_file {
            Some(ref path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                info!("Appending results to {}", path.display());
                Some(BufWriter::new(file))
            }
            None => None,
        };
        let jsonl = match config.jsonl_file {
            Some(ref path) => Some(JsonlWriter::create(path)?),
            None => None,
        };

        Ok(Self {
            output,
            jsonl,
            report_errors: config.report_errors,
            progress,
        })
    }

    /// Drains the queue until every sender is gone and the buffer is empty
    pub async fn drain(mut self, mut queue: mpsc::Receiver<Finding>) -> SinkReport {
        let mut report = SinkReport::default();

        while let Some(finding) = queue.recv().await {
            for line in render_console(&finding, self.report_errors) {
                self.progress.suspend(|| println!("{}", colorize(&line)));
            }

            if let Some(line) = render_found_line(&finding) {
                report.found_lines += 1;
                if let Some(ref mut out) = self.output {
                    if let Err(e) = writeln!(out, "{line}") {
                        error!("Failed to write to output file: {e}");
                    }
                }
            }

            if let Some(ref mut jsonl) = self.jsonl {
                if let Err(e) = jsonl.write(&finding) {
                    error!("Failed to write JSONL record: {e}");
                }
            }

            report.record(finding.kind);
        }

        if let Some(ref mut out) = self.output {
            if let Err(e) = out.flush() {
                error!("Failed to flush output file: {e}");
            }
        }
        if let Some(jsonl) = self.jsonl {
            if let Err(e) = jsonl.finish() {
                error!("Failed to flush JSONL file: {e}");
            }
        }

        report
    }
}

/// The `[FOUND]` line for a status-200 finding
pub fn render_found_line(finding: &Finding) -> Option<String> {
    (finding.status == 200).then(|| {
        format!(
            "[FOUND] {} - Status: {}, Size: {} bytes",
            finding.url,
            finding.status,
            finding.display_size()
        )
    })
}

/// All console lines for one finding, uncolored
pub fn render_console(finding: &Finding, report_errors: bool) -> Vec<String> {
    let size = finding.display_size();
    let url = &finding.url;

    let tagged = match finding.kind {
        FindingKind::ConfirmedLog => Some(format!(
            "[!] POTENTIAL DEBUG LOG FOUND: {url} (Size: {size} bytes)"
        )),
        FindingKind::PossibleLog => Some(format!(
            "[?] Possible debug log (needs verification): {url} (Size: {size} bytes)"
        )),
        FindingKind::ConfigDebugOn => Some(format!("[!] WP_DEBUG ENABLED in: {url}")),
        FindingKind::ConfigFile => Some(format!(
            "[+] Found wp-config file: {url} (Size: {size} bytes)"
        )),
        FindingKind::Error if report_errors => Some(format!(
            "[x] Request failed: {url} ({})",
            finding.error.as_deref().unwrap_or("unknown error")
        )),
        FindingKind::Error => None,
    };

    tagged.into_iter().chain(render_found_line(finding)).collect()
}

fn colorize(line: &str) -> String {
    let Some((tag, rest)) = line.split_once(' ') else {
        return line.to_string();
    };
    let tag = match tag {
        "[!]" => tag.red().bold(),
        "[?]" => tag.yellow(),
        "[+]" => tag.green(),
        "[x]" => tag.dimmed(),
        "[FOUND]" => tag.cyan(),
        _ => return line.to_string(),
    };
    format!("{tag} {rest}")
}
