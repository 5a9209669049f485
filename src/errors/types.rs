//! Error type definitions for the playlist generator
//!
//! The hierarchy mirrors the pipeline: `SourceError` for the page source and
//! renderer, `PipelineError` for stage outcomes the orchestrator may turn into
//! a failed run, and `AppError` at the top for everything the binary reports.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Pipeline stage errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Layered configuration loading errors
    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// File system errors outside of playlist writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report and default-config serialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Page source and renderer errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success HTTP status from the listing page
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Connection, TLS or body decoding failures
    #[error("Request failed: {url} - {message}")]
    Request { url: String, message: String },

    /// Local input file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Headless renderer could not produce a DOM snapshot
    #[error("Render failed: {message}")]
    Render { message: String },
}

/// Errors that move the orchestrator into its failed state
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Fetching the listing failed
    #[error("Fetch stage failed: {0}")]
    Source(#[from] SourceError),

    /// No extraction strategy produced a record
    #[error("No channel records: {reason}")]
    NoRecords { reason: String },

    /// Playlist could not be written
    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration rejected at pipeline construction
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a request error
    pub fn request<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a render error
    pub fn render<M: Into<String>>(message: M) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Map a reqwest failure onto the source taxonomy
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(url)
        } else if let Some(status) = error.status() {
            Self::Http {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            Self::request(url, error.to_string())
        }
    }
}

impl PipelineError {
    /// Create a no-records error
    pub fn no_records<S: Into<String>>(reason: S) -> Self {
        Self::NoRecords {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
