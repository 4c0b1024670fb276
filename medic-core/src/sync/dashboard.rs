//! Dashboard session: wires the poller, the deployment fetcher and the
//! submission path into one store

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{info, warn};

use super::{
    DashboardSnapshot, DashboardStore, DeploymentFetcher, PollerHandle, RunSubmitter, Sources,
    StatusPoller, SubmitSlot,
};
use crate::config::SyncConfig;
use crate::model::{AuthMode, RunAccepted, RunRequest};
use crate::validate::{validate, Advisory};
use crate::{Error, Result};

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Backend acknowledgement
    pub accepted: RunAccepted,
    /// Warnings the operator should see
    pub advisories: Vec<Advisory>,
    /// The normalized request that was sent
    pub request: RunRequest,
}

/// A mounted dashboard
///
/// Polling starts on [`Dashboard::mount`] and stops on
/// [`Dashboard::shutdown`] or when the dashboard is dropped.
pub struct Dashboard {
    store: DashboardStore,
    poller: PollerHandle,
    fetcher: DeploymentFetcher,
    submit: SubmitSlot,
    submitter: Arc<dyn RunSubmitter>,
    config: SyncConfig,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("poller", &self.poller)
            .field("fetcher", &self.fetcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Create the store and start polling; must be called inside a tokio runtime
    pub fn mount(sources: Sources, config: SyncConfig) -> Self {
        let (store, writers) = DashboardStore::new();

        let poller = StatusPoller::new(
            sources.status,
            writers.run,
            config.poll_interval,
            config.request_timeout,
        )
        .start();
        let fetcher =
            DeploymentFetcher::new(sources.deployment, writers.deployment, config.request_timeout);

        info!(
            poll_interval = ?config.poll_interval,
            request_timeout = ?config.request_timeout,
            "Dashboard mounted"
        );

        Self {
            store,
            poller,
            fetcher,
            submit: writers.submit,
            submitter: sources.submitter,
            config,
        }
    }

    /// Copy of the current merged state
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.store.snapshot()
    }

    /// Receiver that wakes whenever any field changes
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.store.subscribe()
    }

    /// Validate and submit a new run
    ///
    /// Nothing goes over the network unless validation passes. On success
    /// a deployment lookup for the same repository starts alongside the
    /// submission; its outcome never affects the submission result.
    pub async fn submit(
        &self,
        draft: &RunRequest,
        auth_mode: AuthMode,
        deployment_token: Option<String>,
    ) -> Result<Submission> {
        if self.store.snapshot().run.is_running() {
            return Err(Error::AlreadyRunning);
        }

        let validated = validate(draft, auth_mode)?;

        let _guard = self.submit.try_begin().ok_or(Error::AlreadyRunning)?;

        self.fetcher
            .trigger(&validated.request.repo_url, deployment_token);

        info!(
            repo_url = %validated.request.repo_url,
            auth_mode = %validated.request.auth_mode,
            advisories = validated.advisories.len(),
            "Submitting run"
        );

        let limit = self.config.request_timeout;
        let accepted = match timeout(limit, self.submitter.start_run(&validated.request)).await {
            Ok(Ok(accepted)) => accepted,
            Ok(Err(e)) => {
                warn!(error = %e, "Run submission failed");
                return Err(e);
            }
            Err(_) => {
                warn!(timeout = ?limit, "Run submission timed out");
                return Err(Error::Timeout(limit));
            }
        };

        info!(message = %accepted.message, "Run accepted");

        Ok(Submission {
            accepted,
            advisories: validated.advisories,
            request: validated.request,
        })
    }

    /// Look up deployment logs outside of a submission
    pub fn refresh_deployment(&self, repo_url: &str, token: Option<String>) -> bool {
        self.fetcher.trigger(repo_url, token)
    }

    /// Hide the deployment panel
    pub fn clear_deployment(&self) {
        self.fetcher.clear();
    }

    /// Stop polling and wait for the poll loop to exit
    pub async fn shutdown(self) {
        let Dashboard { poller, fetcher, .. } = self;
        fetcher.clear();
        poller.shutdown().await;
        info!("Dashboard unmounted");
    }
}
