//! Error types for footprint

use thiserror::Error;

/// Result type alias for footprint operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for footprint
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("No report for timestamp: {0}")]
    UnknownTimestamp(String),

    #[error("Invalid timestamp key: {0:?}")]
    InvalidTimestamp(String),

    #[error("Report index has not been loaded")]
    NotInitialized,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    /// Whether the error came from the transport rather than the report contents
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::FileReadError { .. }
        )
    }
}
