// src/error.rs

//! Unified error handling for the job radar.

use std::fmt;

use thiserror::Error;

/// Result type alias for job radar operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Source fetch error
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Relevance scorer call or reply failed
    #[error("Scorer error: {0}")]
    Scorer(String),

    /// Notification delivery failed
    #[error("Notify error: {0}")]
    Notify(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a scorer error.
    pub fn scorer(message: impl fmt::Display) -> Self {
        Self::Scorer(message.to_string())
    }

    /// Create a notification error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Whether a failure while scanning one source stays local to that source.
    ///
    /// Network, status, parse and selector failures only cost the source its
    /// postings. Everything else aborts the scan.
    pub fn is_source_local(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::HttpStatus { .. }
                | Self::Json(_)
                | Self::Url(_)
                | Self::Selector { .. }
                | Self::Fetch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_are_source_local() {
        assert!(AppError::fetch("acme", "timed out").is_source_local());
        assert!(
            AppError::HttpStatus {
                url: "https://example.com".into(),
                status: 503
            }
            .is_source_local()
        );
        assert!(AppError::selector("[[", "bad").is_source_local());
    }

    #[test]
    fn config_and_io_failures_abort_the_scan() {
        assert!(!AppError::config("no sources").is_source_local());
        assert!(!AppError::Io(std::io::Error::other("disk")).is_source_local());
    }

    #[test]
    fn display_includes_context() {
        let err = AppError::fetch("greenhouse:acme", "HTTP 404");
        assert_eq!(err.to_string(), "Fetch error for greenhouse:acme: HTTP 404");
    }
}
