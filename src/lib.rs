//! Sumi-Sift: a polite, selector-driven record extractor
//!
//! This crate fetches a single web page after checking the site's robots.txt,
//! then extracts one structured record per matched container element using
//! caller-supplied CSS selectors.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Sift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("{0}")]
    Validation(#[from] crawler::ValidationError),

    #[error("Request failed with status code {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unsupported content type '{content_type}' for {url}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Empty document body for {url}")]
    EmptyBody { url: String },

    #[error("Response body for {url} exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },

    #[error("{reason}")]
    FetchFailed { reason: String },

    #[error("URL disallowed by robots.txt")]
    RobotsDenied { url: String },

    #[error("Robots.txt unavailable: {source}")]
    RobotsUnavailable { source: Box<SiftError> },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PipelineState,
        to: state::PipelineState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiftError {
    /// Classifies a reqwest error raised while requesting `url`
    ///
    /// Timeouts, connection failures, and redirect overflows get their own
    /// variants so the message carried back to the caller stays readable.
    pub fn from_request(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SiftError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            SiftError::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else if error.is_redirect() {
            SiftError::RedirectLimit {
                url: url.to_string(),
            }
        } else if let Some(status) = error.status() {
            SiftError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            SiftError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid bind address in config: {0}")]
    InvalidAddress(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    extract, run_extraction, ExtractionRequest, ExtractionResult, FetchOutcome, Fetcher, Record,
    SelectorSet, ValidationError,
};
pub use state::PipelineState;
pub use crate::url::{parse_target_url, robots_url};
