//! Run configuration validation
//!
//! Every draft is checked before anything touches the network. HTTPS runs
//! need a GitHub token; SSH runs need a private key and only get an
//! advisory when the token is missing, since the agent can still push but
//! may not be able to open a pull request.

use std::fmt;

use thiserror::Error;

use crate::model::{AuthMode, RunRequest};
use crate::{Error, Result};

/// A problem that blocks submission
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A required identity field is blank
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("a GitHub token is required for HTTPS mode")]
    MissingGithubToken,

    #[error("a private key is required for SSH mode")]
    MissingPrivateKey,
}

/// A non-blocking warning attached to an accepted draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// SSH run without a GitHub token
    PullRequestMayBeSkipped,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::PullRequestMayBeSkipped => {
                "PR creation still requires a GitHub token; automatic PRs might be skipped"
            }
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// A normalized draft that is safe to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRun {
    pub request: RunRequest,
    pub advisories: Vec<Advisory>,
}

impl ValidatedRun {
    pub fn has_advisories(&self) -> bool {
        !self.advisories.is_empty()
    }
}

/// Validate and normalize a draft for the given auth mode
///
/// The mode argument wins over whatever the draft carries, so the result
/// always has the tag the operator selected. All problems are reported at
/// once.
pub fn validate(draft: &RunRequest, auth_mode: AuthMode) -> Result<ValidatedRun> {
    let repo_url = draft.repo_url.trim();
    let team_name = draft.team_name.trim();
    let leader_name = draft.leader_name.trim();
    let github_token = draft.github_token.trim();
    let private_key = draft
        .private_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let mut problems = Vec::new();
    for (name, value) in [
        ("repo_url", repo_url),
        ("team_name", team_name),
        ("leader_name", leader_name),
    ] {
        if value.is_empty() {
            problems.push(ValidationError::MissingField(name));
        }
    }

    let mut advisories = Vec::new();
    match auth_mode {
        AuthMode::Https => {
            if github_token.is_empty() {
                problems.push(ValidationError::MissingGithubToken);
            }
        }
        AuthMode::Ssh => {
            if private_key.is_none() {
                problems.push(ValidationError::MissingPrivateKey);
            }
            if github_token.is_empty() {
                advisories.push(Advisory::PullRequestMayBeSkipped);
            }
        }
    }

    if !problems.is_empty() {
        return Err(Error::Validation(problems));
    }

    // OpenSSH refuses keys without the trailing newline
    let private_key = match auth_mode {
        AuthMode::Ssh => private_key.map(|k| format!("{}\n", k)),
        AuthMode::Https => None,
    };

    Ok(ValidatedRun {
        request: RunRequest {
            repo_url: repo_url.to_string(),
            team_name: team_name.to_string(),
            leader_name: leader_name.to_string(),
            auth_mode,
            github_token: github_token.to_string(),
            private_key,
        },
        advisories,
    })
}
