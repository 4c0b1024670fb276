//! Error types for agent backend requests

use thiserror::Error;

/// Result type for backend requests
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the agent backend
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response without a usable reason
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend refused the run, with its reason
    #[error("{0}")]
    Rejected(String),
}

impl From<Error> for medic_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Rejected(reason) => medic_core::Error::Rejected(reason),
            Error::Url(e) => medic_core::Error::Config(format!("Invalid backend URL: {}", e)),
            other => medic_core::Error::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_reason() {
        let err: medic_core::Error = Error::Rejected("Agent is already running".to_string()).into();
        assert!(matches!(err, medic_core::Error::Rejected(ref r) if r == "Agent is already running"));
    }

    #[test]
    fn test_status_becomes_transport() {
        let err: medic_core::Error = Error::Status {
            status: 502,
            body: "bad gateway".to_string(),
        }
        .into();
        match err {
            medic_core::Error::Transport(msg) => assert!(msg.contains("502")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
