//! Fixed-cadence status polling
//!
//! Every tick issues one status request without waiting for earlier ones,
//! so a slow response can arrive after a newer one. Requests carry a
//! sequence number and the run slot ignores anything older than what it
//! already shows. Failures are logged and the last good snapshot stays.
//! There is no backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{RunSlot, StatusSource};
use crate::model::RunStatus;
use crate::{Error, Result};

/// Polls a [`StatusSource`] and publishes into a [`RunSlot`]
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    slot: RunSlot,
    period: Duration,
    request_timeout: Duration,
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("period", &self.period)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl StatusPoller {
    /// Create a poller; nothing happens until [`StatusPoller::start`]
    pub fn new(
        source: Arc<dyn StatusSource>,
        slot: RunSlot,
        period: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            source,
            slot,
            period,
            request_timeout,
        }
    }

    /// Spawn the poll loop; it runs until the returned handle is shut down or dropped
    pub fn start(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        PollerHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        info!(period = ?self.period, "Status poller started");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight: JoinSet<(u64, Result<RunStatus>)> = JoinSet::new();
        let mut next_seq: u64 = 0;

        loop {
            tokio::select! {
                // A dropped sender also ends the loop
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    next_seq += 1;
                    let seq = next_seq;
                    let source = self.source.clone();
                    let limit = self.request_timeout;
                    debug!(seq, "Polling status");
                    in_flight.spawn(async move {
                        let result = match timeout(limit, source.fetch_status()).await {
                            Ok(result) => result,
                            Err(_) => Err(Error::Timeout(limit)),
                        };
                        (seq, result)
                    });
                }
                Some(joined) = in_flight.join_next() => {
                    match joined {
                        Ok((seq, result)) => self.handle(seq, result),
                        Err(e) => warn!(error = %e, "Status poll task failed"),
                    }
                }
            }
        }

        in_flight.abort_all();
        info!(polls = next_seq, "Status poller stopped");
    }

    fn handle(&mut self, seq: u64, result: Result<RunStatus>) {
        match result {
            Ok(run) => {
                let phase = run.status;
                let iteration = run.iteration;
                if self.slot.apply(seq, run) {
                    debug!(seq, %phase, iteration, "Applied status snapshot");
                }
            }
            Err(e) => {
                // Keep showing the last good snapshot
                warn!(seq, error = %e, "Status poll failed");
            }
        }
    }
}

/// Owner of a running poll loop
///
/// Dropping the handle aborts the loop, so polling never outlives the
/// dashboard session.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling and wait for the loop to exit
    ///
    /// No request is issued once this returns.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Status poller ended abnormally");
                }
            }
        }
    }

    /// Whether the poll loop has exited
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
