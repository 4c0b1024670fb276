//! Status synchronization engine
//!
//! Three producers feed one [`DashboardSnapshot`]:
//! - the [`StatusPoller`] owns the run status and refreshes it on a timer
//! - the [`DeploymentFetcher`] owns the deployment panel and runs once per trigger
//! - the submission path in [`Dashboard`] owns the `submitting` flag
//!
//! Each producer holds the only writer for its field. Readers take
//! snapshots or subscribe to changes; they never write.

mod dashboard;
mod deploy;
mod poller;
mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{DeploymentLookup, RunAccepted, RunRequest, RunStatus};
use crate::Result;

pub use dashboard::{Dashboard, Submission};
pub use deploy::DeploymentFetcher;
pub use poller::{PollerHandle, StatusPoller};
pub use store::{DashboardSnapshot, DashboardStore, DeploymentSlot, RunSlot, StoreWriters, SubmitSlot};

/// Source of run status snapshots
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Read the current status of the automation job
    async fn fetch_status(&self) -> Result<RunStatus>;
}

/// Source of deployment build logs
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    /// Look up the latest deployment of a repository
    ///
    /// `token` may be absent; the service can allow anonymous lookups.
    async fn lookup_deployment(&self, repo_url: &str, token: Option<&str>)
        -> Result<DeploymentLookup>;
}

/// Accepts new run requests
#[async_trait]
pub trait RunSubmitter: Send + Sync {
    /// Ask the backend to start a run; a refusal is `Error::Rejected`
    async fn start_run(&self, request: &RunRequest) -> Result<RunAccepted>;
}

/// The collaborators a dashboard talks to
#[derive(Clone)]
pub struct Sources {
    pub status: Arc<dyn StatusSource>,
    pub deployment: Arc<dyn DeploymentSource>,
    pub submitter: Arc<dyn RunSubmitter>,
}

impl Sources {
    /// Use one backend for all three roles
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: StatusSource + DeploymentSource + RunSubmitter + 'static,
    {
        Self {
            status: backend.clone(),
            deployment: backend.clone(),
            submitter: backend,
        }
    }
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources").finish_non_exhaustive()
    }
}
