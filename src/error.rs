//! Error types for LeakLens

use thiserror::Error;

/// Main error type for LeakLens operations
#[derive(Debug, Error)]
pub enum LeakLensError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("HTTP connection error: {0}")]
    ConnectionError(#[from] hyper::Error),

    #[error("Invalid HTTP request: {0}")]
    RequestError(#[from] hyper::http::Error),

    #[error("TLS error: {0}")]
    TlsError(#[from] native_tls::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid target '{0}'")]
    TargetError(String),

    #[error("No targets to scan")]
    NoTargets,

    #[error("Scanner task failed: {0}")]
    TaskError(String),
}

/// Result type alias for LeakLens operations
pub type Result<T> = std::result::Result<T, LeakLensError>;
