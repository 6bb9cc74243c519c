//! Exposed `debug.log` discovery
//!
//! Two-phase probe: a HEAD existence check gates the GET. Only the first
//! few lines of the body are downloaded for classification.

use super::catalog::LOG_PATHS;
use super::classify::{self, LOG_LINE_BUDGET};
use crate::error::Result;
use crate::http::{HttpClient, HttpResponse};
use crate::models::{Finding, ProbeFamily};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

/// Upper bound on bytes buffered while looking for the leading lines
const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Probes the log-path catalog on one target
pub struct DebugLogProber;

#[async_trait]
impl super::PathProber for DebugLogProber {
    fn family(&self) -> ProbeFamily {
        ProbeFamily::DebugLog
    }

    fn paths(&self) -> &'static [&'static str] {
        LOG_PATHS
    }

    async fn probe(&self, client: &HttpClient, url: &str) -> Option<Finding> {
        let head = match client.head(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("HEAD {url} failed: {e}");
                return Some(Finding::error(self.family(), url, e));
            }
        };

        if head.status() != StatusCode::OK {
            debug!("HEAD {url} -> {}, skipping", head.status());
            return None;
        }

        let mut response = match client.get(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("GET {url} failed: {e}");
                return Some(Finding::error(self.family(), url, e));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!("GET {url} -> {status} after 200 HEAD, skipping");
            return None;
        }

        let size = response.content_length();
        let body_head = match read_head_lines(&mut response, LOG_LINE_BUDGET).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Reading {url} failed: {e}");
                return Some(Finding::error(self.family(), url, e));
            }
        };

        let kind = classify::classify_log(&body_head, size);
        if kind.is_none() && size.is_none() {
            debug!("{url} has no log signal and no Content-Length, dropping");
        }
        kind.map(|kind| Finding::new(self.family(), kind, url, status.as_u16(), size))
    }
}

/// Reads the body chunk by chunk until `lines` complete lines are buffered,
/// the body ends, or [`MAX_HEAD_BYTES`] is reached.
async fn read_head_lines(response: &mut HttpResponse, lines: usize) -> Result<String> {
    let mut head = HeadLines::new(lines);
    while let Some(chunk) = response.chunk().await? {
        if head.push(&chunk) {
            break;
        }
    }
    Ok(head.into_text())
}

/// Leading bytes of a body plus a running count of the newlines in them
struct HeadLines {
    buf: Vec<u8>,
    newlines: usize,
    wanted: usize,
}

impl HeadLines {
    fn new(wanted: usize) -> Self {
        Self {
            buf: Vec::new(),
            newlines: 0,
            wanted,
        }
    }

    /// Appends a chunk, returns true once enough has been read
    fn push(&mut self, chunk: &[u8]) -> bool {
        self.newlines += chunk.iter().filter(|b| **b == b'\n').count();
        self.buf.extend_from_slice(chunk);
        self.newlines >= self.wanted || self.buf.len() >= MAX_HEAD_BYTES
    }

    fn into_text(mut self) -> String {
        self.buf.truncate(MAX_HEAD_BYTES);
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_lines_counts_across_chunks() {
        let mut head = HeadLines::new(5);
        assert!(!head.push(b"line one\nline"));
        assert!(!head.push(b" two\n"));
        assert!(!head.push(b""));
        assert_eq!(head.newlines, 2);
        assert!(head.push(b"three\nfour\nfive\nsix\n"));
        assert_eq!(head.newlines, 6);
        assert!(head.into_text().starts_with("line one\nline two\nthree"));
    }

    #[test]
    fn test_head_lines_stops_at_byte_cap() {
        let mut head = HeadLines::new(5);
        let chunk = vec![b'x'; 40 * 1024];
        assert!(!head.push(&chunk));
        assert!(head.push(&chunk));
        assert_eq!(head.newlines, 0);
        assert_eq!(head.into_text().len(), MAX_HEAD_BYTES);
    }
}
