//! Error types for the chat component
//!
//! `ChatError` covers everything that can go wrong during one exchange.
//! The session converts every variant into the same user-visible message,
//! so the variants exist for logging and tests, not for the transcript.
//! `ConfigError` covers startup configuration and credential loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing a reply for one exchange
#[derive(Error, Debug)]
pub enum ChatError {
    /// No API key was loaded at startup
    #[error("API key is not configured")]
    MissingCredential,

    /// The request never produced an HTTP response (connect error, timeout, etc.)
    #[error("Failed to send HTTP request to Gemini API: {message}")]
    Transport {
        /// Underlying transport error message
        message: String,
        /// Whether the request hit the client timeout
        is_timeout: bool,
    },

    /// The API answered with a non-success status code
    #[error("Gemini API returned error status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// The API refused to answer the prompt
    #[error("Gemini API blocked the prompt: {0}")]
    Blocked(String),

    /// The response body could not be read or parsed
    #[error("Failed to parse response from Gemini API: {0}")]
    MalformedBody(String),

    /// The response parsed but had no candidate with any part
    #[error("Gemini API response contains no candidates")]
    NoCandidates,

    /// The first part of the first candidate held no text
    #[error("Gemini API response text is empty")]
    EmptyReply,

    /// The exchange was cancelled before the reply arrived
    #[error("Request cancelled")]
    Cancelled,
}

impl ChatError {
    /// Categorize a reqwest error that happened before a response was received
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        ChatError::Transport {
            message: error.to_string(),
            is_timeout: error.is_timeout(),
        }
    }

    /// HTTP status code, when the API answered with one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChatError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short category name used in log fields
    pub fn category(&self) -> &'static str {
        match self {
            ChatError::MissingCredential => "missing_credential",
            ChatError::Transport {
                is_timeout: true, ..
            } => "timeout",
            ChatError::Transport { .. } => "transport",
            ChatError::Status { status: 429, .. } => "rate_limited",
            ChatError::Status { .. } => "status",
            ChatError::Blocked(_) => "blocked",
            ChatError::MalformedBody(_) => "malformed_body",
            ChatError::NoCandidates | ChatError::EmptyReply => "no_reply",
            ChatError::Cancelled => "cancelled",
        }
    }
}

/// Errors that can occur while loading configuration or the credential file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Credential file exists but could not be read
    #[error("Failed to read credential file {path}: {source}")]
    CredentialRead {
        /// Path of the credential file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Credential file is not the expected JSON object
    #[error("Failed to parse credential file {path}: {source}")]
    CredentialParse {
        /// Path of the credential file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let e = ChatError::Status {
            status: 403,
            body: "API key not valid".to_string(),
        };
        assert!(e.to_string().contains("403"));
        assert!(e.to_string().contains("API key not valid"));
        assert_eq!(e.status_code(), Some(403));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ChatError::MissingCredential.category(), "missing_credential");
        assert_eq!(
            ChatError::Status {
                status: 429,
                body: String::new()
            }
            .category(),
            "rate_limited"
        );
        assert_eq!(
            ChatError::Transport {
                message: "timed out".to_string(),
                is_timeout: true
            }
            .category(),
            "timeout"
        );
        assert_eq!(ChatError::NoCandidates.category(), "no_reply");
        assert_eq!(ChatError::EmptyReply.category(), "no_reply");
        assert_eq!(ChatError::Cancelled.status_code(), None);
    }

    #[test]
    fn test_config_error_display() {
        let e = ConfigError::Invalid("timeout_secs must be > 0".to_string());
        assert!(e.to_string().contains("timeout_secs must be > 0"));
    }
}
