//! HTTP/1.1 transport that puts the request target on the wire verbatim
//!
//! `url::Url` (and so reqwest) collapses `.` and `..` segments before
//! sending. Paths that exist to exercise a server's own rewrite rules must
//! reach it unnormalized, so they go through a bare hyper connection.

use crate::error::{LeakLensError, Result};
use http_body_util::Empty;
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONNECTION, HOST, USER_AGENT};
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// A URL split into connection details and the untouched request target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTarget {
    pub https: bool,
    pub host: String,
    pub port: u16,
    pub authority: String,
    pub path: String,
}

impl RawTarget {
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url)?;
        let https = match parsed.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(LeakLensError::TargetError(format!(
                    "unsupported scheme '{other}' in {url}"
                )))
            }
        };

        let host = match parsed.host() {
            Some(url::Host::Domain(domain)) => domain.to_string(),
            Some(url::Host::Ipv4(ip)) => ip.to_string(),
            Some(url::Host::Ipv6(ip)) => ip.to_string(),
            None => return Err(LeakLensError::TargetError(url.to_string())),
        };
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| LeakLensError::TargetError(url.to_string()))?;

        let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
        let (authority, path) = match rest.find(['/', '?']) {
            Some(idx) => rest.split_at(idx),
            None => (rest, "/"),
        };
        let authority = authority.rsplit('@').next().unwrap_or(authority);
        let path = if path.starts_with('?') {
            format!("/{path}")
        } else {
            path.to_string()
        };

        Ok(Self {
            https,
            host,
            port,
            authority: authority.to_string(),
            path,
        })
    }
}

/// Returns true if the path part of `url` has a `.` or `..` segment
pub fn has_dot_segments(url: &str) -> bool {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let Some(start) = rest.find('/') else {
        return false;
    };
    rest[start..]
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .split('/')
        .any(|segment| segment == "." || segment == "..")
}

/// One-shot connection per request, certificate checks disabled
pub struct RawClient {
    tls: tokio_native_tls::TlsConnector,
    user_agent: String,
    timeout: Duration,
}

/// Response head plus the deadline its body must arrive by
pub struct RawResponse {
    pub response: Response<Incoming>,
    pub deadline: Instant,
}

impl RawClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;

        Ok(Self {
            tls: tokio_native_tls::TlsConnector::from(tls),
            user_agent: user_agent.to_string(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `method` to `url` without touching the path
    pub async fn send(&self, method: Method, url: &str) -> Result<RawResponse> {
        let target = RawTarget::parse(url)?;
        let request = Request::builder()
            .method(method)
            .uri(target.path.as_str())
            .header(HOST, target.authority.as_str())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(CONNECTION, "close")
            .body(Empty::<Bytes>::new())?;

        let deadline = Instant::now() + self.timeout;
        let response = timeout_at(deadline, self.exchange(&target, request))
            .await
            .map_err(|_| LeakLensError::Timeout(self.timeout.as_secs()))??;

        Ok(RawResponse { response, deadline })
    }

    async fn exchange(
        &self,
        target: &RawTarget,
        request: Request<Empty<Bytes>>,
    ) -> Result<Response<Incoming>> {
        let stream = TcpStream::connect((target.host.as_str(), target.port)).await?;
        if target.https {
            let tls = self.tls.connect(&target.host, stream).await?;
            send_on(TokioIo::new(tls), request).await
        } else {
            send_on(TokioIo::new(stream), request).await
        }
    }
}

async fn send_on<T>(io: T, request: Request<Empty<Bytes>>) -> Result<Response<Incoming>>
where
    T: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!("Raw connection closed with error: {e}");
        }
    });
    Ok(sender.send_request(request).await?)
}
