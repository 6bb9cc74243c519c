//! Exposed `wp-config.php` and backup discovery
//!
//! Single-phase: these files are small, so each path is fetched with a GET
//! and the whole body is scanned for an enabled `WP_DEBUG`.

use super::catalog::CONFIG_PATHS;
use super::classify;
use crate::http::HttpClient;
use crate::models::{Finding, ProbeFamily};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

/// Probes the config-path catalog on one target
pub struct WpConfigProber;

#[async_trait]
impl super::PathProber for WpConfigProber {
    fn family(&self) -> ProbeFamily {
        ProbeFamily::WpConfig
    }

    fn paths(&self) -> &'static [&'static str] {
        CONFIG_PATHS
    }

    async fn probe(&self, client: &HttpClient, url: &str) -> Option<Finding> {
        let response = match client.get(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("GET {url} failed: {e}");
                return Some(Finding::error(self.family(), url, e));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!("GET {url} -> {status}, skipping");
            return None;
        }

        let declared = response.content_length();
        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Reading {url} failed: {e}");
                return Some(Finding::error(self.family(), url, e));
            }
        };
        let size = declared.or(Some(body.len() as u64));
        let text = String::from_utf8_lossy(&body);

        classify::classify_config(&text, size)
            .map(|kind| Finding::new(self.family(), kind, url, status.as_u16(), size))
    }
}
