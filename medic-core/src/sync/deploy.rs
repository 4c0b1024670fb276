//! One-shot deployment log lookups
//!
//! Unlike the status poller this runs once per trigger. A new trigger
//! cancels the lookup in flight; only the latest deployment is relevant.
//! "No deployment" and "could not find out" both end with no panel shown.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{DeploymentSlot, DeploymentSource};
use crate::model::{DeploymentLogState, DeploymentLookup};
use crate::{Error, Result};

/// Runs deployment lookups and publishes them into a [`DeploymentSlot`]
pub struct DeploymentFetcher {
    source: Arc<dyn DeploymentSource>,
    slot: Arc<DeploymentSlot>,
    request_timeout: Duration,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for DeploymentFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentFetcher")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl DeploymentFetcher {
    pub fn new(
        source: Arc<dyn DeploymentSource>,
        slot: DeploymentSlot,
        request_timeout: Duration,
    ) -> Self {
        Self {
            source,
            slot: Arc::new(slot),
            request_timeout,
            in_flight: Mutex::new(None),
        }
    }

    /// Start a lookup for `repo_url`, superseding any lookup in flight
    ///
    /// Does nothing and returns false when the URL is blank. Must be called
    /// from within a tokio runtime.
    pub fn trigger(&self, repo_url: &str, token: Option<String>) -> bool {
        let repo_url = repo_url.trim();
        if repo_url.is_empty() {
            debug!("No repository URL, skipping deployment lookup");
            return false;
        }

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }

        let generation = self.slot.begin();
        info!(repo_url, generation, "Looking up deployment");

        let source = self.source.clone();
        let slot = self.slot.clone();
        let limit = self.request_timeout;
        let repo_url = repo_url.to_string();
        let token = token.filter(|t| !t.trim().is_empty());

        *in_flight = Some(tokio::spawn(async move {
            let result = lookup(source.as_ref(), &repo_url, token.as_deref(), limit).await;
            slot.settle(generation, settle_state(&repo_url, result));
        }));
        true
    }

    /// Hide the panel and cancel any lookup in flight
    pub fn clear(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
        self.slot.clear();
    }
}

impl Drop for DeploymentFetcher {
    fn drop(&mut self) {
        let in_flight = self.in_flight.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = in_flight.take() {
            task.abort();
        }
    }
}

async fn lookup(
    source: &dyn DeploymentSource,
    repo_url: &str,
    token: Option<&str>,
    limit: Duration,
) -> Result<DeploymentLookup> {
    match timeout(limit, source.lookup_deployment(repo_url, token)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(limit)),
    }
}

fn settle_state(repo_url: &str, result: Result<DeploymentLookup>) -> DeploymentLogState {
    match result {
        Ok(DeploymentLookup::NotFound) => {
            debug!(repo_url, "No deployment for repository");
            DeploymentLogState::NotFound
        }
        Ok(found @ DeploymentLookup::Found { .. }) => {
            info!(repo_url, "Deployment found");
            found.into()
        }
        Err(e) => {
            warn!(repo_url, error = %e, "Deployment lookup failed");
            DeploymentLogState::Idle
        }
    }
}
