//! Error types for Medic

use std::time::Duration;

use thiserror::Error;

use crate::validate::ValidationError;

/// Result type alias for Medic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Medic operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run request failed validation; nothing was sent
    #[error("Invalid run request: {}", join_problems(.0))]
    Validation(Vec<ValidationError>),

    /// The backend could not be reached or answered with garbage
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend refused to start the run
    #[error("Run rejected: {0}")]
    Rejected(String),

    /// A request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// A run is already in progress or being submitted
    #[error("Agent is already running")]
    AlreadyRunning,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

fn join_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_problem() {
        let err = Error::Validation(vec![
            ValidationError::MissingField("repo_url"),
            ValidationError::MissingGithubToken,
        ]);
        let msg = err.to_string();
        assert!(msg.contains("repo_url"));
        assert!(msg.contains("GitHub token"));
    }
}
