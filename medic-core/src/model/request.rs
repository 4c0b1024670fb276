//! New-run request submitted to the agent backend

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AuthMode;

/// Draft of a new run as entered by the operator
///
/// Credentials are carried verbatim; the validator decides which of them
/// the selected [`AuthMode`] needs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub repo_url: String,
    pub team_name: String,
    pub leader_name: String,
    pub auth_mode: AuthMode,
    #[serde(default)]
    pub github_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl RunRequest {
    /// Create a draft with the required identity fields
    pub fn new(
        repo_url: impl Into<String>,
        team_name: impl Into<String>,
        leader_name: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            team_name: team_name.into(),
            leader_name: leader_name.into(),
            ..Self::default()
        }
    }

    /// Set the credential path
    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }

    /// Set the GitHub token
    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = token.into();
        self
    }

    /// Set the SSH private key
    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("repo_url", &self.repo_url)
            .field("team_name", &self.team_name)
            .field("leader_name", &self.leader_name)
            .field("auth_mode", &self.auth_mode)
            .field("github_token", &redact(&self.github_token))
            .field(
                "private_key",
                &self.private_key.as_deref().map(redact),
            )
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// Backend acknowledgement of an accepted run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAccepted {
    #[serde(default)]
    pub message: String,
}
