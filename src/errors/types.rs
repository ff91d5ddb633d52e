//! Error type definitions for openiptv

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Structural failure on a single playlist line
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// XMLTV document could not be read
    #[error("XMLTV error: {message}")]
    Xmltv { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Upstream answered with an empty body
    #[error("Empty playlist received from {url}")]
    EmptyResponse { url: String },

    /// A playlist parsed successfully but yielded no channels
    #[error("No channels found in playlist")]
    NoChannels,

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local file access errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a parse error with a custom message
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an XMLTV error
    pub fn xmltv<S: Into<String>>(message: S) -> Self {
        Self::Xmltv {
            message: message.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AppError::parse("missing ':' after #EXTINF").to_string(),
            "Parse error: missing ':' after #EXTINF"
        );
        assert_eq!(
            AppError::UpstreamStatus {
                status: 404,
                url: "http://example.com/list.m3u".to_string()
            }
            .to_string(),
            "Upstream returned HTTP 404 for http://example.com/list.m3u"
        );
        assert_eq!(AppError::NoChannels.to_string(), "No channels found in playlist");
    }
}
