//! Deployment log state for the secondary panel
//!
//! The panel is fed by a one-shot lookup per submission, never by the
//! status poll loop.

use serde::{Deserialize, Serialize};

/// The deployment found for a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub project_name: String,
    /// Provider state such as "READY", "BUILDING" or "ERROR"
    pub state: String,
}

/// Answer of the deployment-logs endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeploymentLookup {
    /// No deployment exists for the repository
    NotFound,

    /// A deployment exists, with its build log
    Found {
        deployment: Deployment,
        #[serde(default)]
        logs: Vec<String>,
    },
}

/// What the dashboard currently knows about the deployment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeploymentLogState {
    /// Never triggered, or the last lookup failed
    #[default]
    Idle,
    /// Lookup in flight
    Loading,
    Found {
        deployment: Deployment,
        logs: Vec<String>,
    },
    /// Lookup completed and there is nothing to show
    NotFound,
}

/// Renderable view of the deployment panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentPanel<'a> {
    Fetching,
    Ready {
        deployment: &'a Deployment,
        logs: &'a [String],
    },
}

impl DeploymentLogState {
    /// Whether a lookup is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, DeploymentLogState::Loading)
    }

    /// Whether the panel should be shown at all
    pub fn is_visible(&self) -> bool {
        self.panel().is_some()
    }

    /// Panel to render; `None` for both idle and not-found
    pub fn panel(&self) -> Option<DeploymentPanel<'_>> {
        match self {
            DeploymentLogState::Idle | DeploymentLogState::NotFound => None,
            DeploymentLogState::Loading => Some(DeploymentPanel::Fetching),
            DeploymentLogState::Found { deployment, logs } => Some(DeploymentPanel::Ready {
                deployment,
                logs: logs.as_slice(),
            }),
        }
    }
}

impl From<DeploymentLookup> for DeploymentLogState {
    fn from(lookup: DeploymentLookup) -> Self {
        match lookup {
            DeploymentLookup::NotFound => DeploymentLogState::NotFound,
            DeploymentLookup::Found { deployment, logs } => {
                DeploymentLogState::Found { deployment, logs }
            }
        }
    }
}
