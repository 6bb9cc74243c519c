//! Shared HTTP client with request and in-flight accounting

use super::raw::{self, RawClient};
use crate::error::{LeakLensError, Result};
use crate::models::ScanConfig;
use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming};
use reqwest::{Client, Method, StatusCode};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// HTTP client wrapper shared read-only by every probing task.
///
/// Certificate validation is disabled: targets with self-signed or broken
/// TLS must still be scanned. The timeout applies per request. URLs whose
/// path carries `.` or `..` segments are sent through [`RawClient`] so the
/// segments reach the server as written.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    raw: Arc<RawClient>,
    stats: Arc<RequestStats>,
}

#[derive(Default)]
struct RequestStats {
    total: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight gauge when the request future completes or is dropped
struct InFlight<'a>(&'a RequestStats);

impl<'a> InFlight<'a> {
    fn enter(stats: &'a RequestStats) -> Self {
        stats.total.fetch_add(1, Ordering::Relaxed);
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Response from either transport, body still unread
pub struct HttpResponse {
    inner: Inner,
}

enum Inner {
    Pooled(reqwest::Response),
    Verbatim {
        response: hyper::Response<Incoming>,
        deadline: Instant,
        timeout_secs: u64,
    },
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        match &self.inner {
            Inner::Pooled(response) => response.status(),
            Inner::Verbatim { response, .. } => response.status(),
        }
    }

    /// Declared `Content-Length`, if the server sent one
    pub fn content_length(&self) -> Option<u64> {
        match &self.inner {
            Inner::Pooled(response) => response.content_length(),
            Inner::Verbatim { response, .. } => response
                .headers()
                .get(hyper::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Next chunk of the body, `None` once it ends
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        match &mut self.inner {
            Inner::Pooled(response) => Ok(response.chunk().await?),
            Inner::Verbatim {
                response,
                deadline,
                timeout_secs,
            } => loop {
                let frame = timeout_at(*deadline, response.body_mut().frame())
                    .await
                    .map_err(|_| LeakLensError::Timeout(*timeout_secs))?;
                match frame {
                    None => return Ok(None),
                    Some(frame) => {
                        if let Ok(data) = frame?.into_data() {
                            return Ok(Some(data));
                        }
                    }
                }
            },
        }
    }

    /// Reads the whole body
    pub async fn bytes(self) -> Result<Bytes> {
        match self.inner {
            Inner::Pooled(response) => Ok(response.bytes().await?),
            Inner::Verbatim {
                response,
                deadline,
                timeout_secs,
            } => {
                let collected = timeout_at(deadline, response.into_body().collect())
                    .await
                    .map_err(|_| LeakLensError::Timeout(timeout_secs))??;
                Ok(collected.to_bytes())
            }
        }
    }
}

impl HttpClient {
    /// Creates a new HttpClient from scan configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            raw: Arc::new(RawClient::new(&config.user_agent, timeout)?),
            stats: Arc::new(RequestStats::default()),
        })
    }

    /// Sends a HEAD request
    pub async fn head(&self, url: &str) -> Result<HttpResponse> {
        self.send(Method::HEAD, url).await
    }

    /// Sends a GET request. The body is left unread.
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.send(Method::GET, url).await
    }

    /// Returns the total number of requests made
    pub fn request_count(&self) -> u64 {
        self.stats.total.load(Ordering::Relaxed)
    }

    /// Returns the number of requests currently awaiting a response
    pub fn in_flight(&self) -> usize {
        self.stats.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the highest in-flight count observed so far
    pub fn peak_in_flight(&self) -> usize {
        self.stats.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn send(&self, method: Method, url: &str) -> Result<HttpResponse> {
        let _guard = InFlight::enter(&self.stats);

        let inner = if raw::has_dot_segments(url) {
            let sent = self.raw.send(method.clone(), url).await?;
            Inner::Verbatim {
                response: sent.response,
                deadline: sent.deadline,
                timeout_secs: self.raw.timeout().as_secs(),
            }
        } else {
            Inner::Pooled(self.client.request(method.clone(), url).send().await?)
        };

        let response = HttpResponse { inner };
        debug!("Response: {} for {method} {url}", response.status());
        Ok(response)
    }
}
