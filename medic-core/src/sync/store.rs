//! Merged dashboard state with one writer per field

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::model::{DeploymentLogState, RunStatus};

/// Everything the presentation layer renders, as one consistent value
///
/// `run` and `deployment` come from independent streams and are not
/// time-aligned with each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSnapshot {
    /// Last applied status snapshot
    pub run: RunStatus,
    /// When `run` was last replaced, `None` before the first good poll
    pub run_updated_at: Option<DateTime<Utc>>,
    pub deployment: DeploymentLogState,
    pub submitting: bool,
}

/// Read side of the dashboard state
#[derive(Debug, Clone)]
pub struct DashboardStore {
    tx: Arc<watch::Sender<DashboardSnapshot>>,
}

/// The three writers, one per field; each is handed to exactly one owner
#[derive(Debug)]
pub struct StoreWriters {
    pub run: RunSlot,
    pub deployment: DeploymentSlot,
    pub submit: SubmitSlot,
}

impl DashboardStore {
    /// Create a store holding the idle defaults, plus its writers
    pub fn new() -> (Self, StoreWriters) {
        let (tx, _rx) = watch::channel(DashboardSnapshot::default());
        let tx = Arc::new(tx);
        let writers = StoreWriters {
            run: RunSlot {
                tx: tx.clone(),
                last_seq: 0,
            },
            deployment: DeploymentSlot {
                tx: tx.clone(),
                generation: Mutex::new(0),
            },
            submit: SubmitSlot { tx: tx.clone() },
        };
        (Self { tx }, writers)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every change
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.tx.subscribe()
    }
}

/// Writer for the run status, owned by the poller
///
/// Snapshots are tagged with the sequence number of the request that
/// produced them; anything older than what is already shown is dropped.
#[derive(Debug)]
pub struct RunSlot {
    tx: Arc<watch::Sender<DashboardSnapshot>>,
    last_seq: u64,
}

impl RunSlot {
    /// Replace the run status wholesale; returns false for a stale response
    pub fn apply(&mut self, seq: u64, run: RunStatus) -> bool {
        if seq <= self.last_seq {
            debug!(seq, last_applied = self.last_seq, "Discarding out-of-order status");
            return false;
        }
        self.last_seq = seq;
        self.tx.send_modify(|snap| {
            snap.run = run;
            snap.run_updated_at = Some(Utc::now());
        });
        true
    }

    /// Sequence number of the snapshot currently shown
    pub fn last_applied(&self) -> u64 {
        self.last_seq
    }
}

/// Writer for the deployment panel, owned by the fetcher
///
/// Every lookup gets a generation; only the newest one may settle the state.
#[derive(Debug)]
pub struct DeploymentSlot {
    tx: Arc<watch::Sender<DashboardSnapshot>>,
    generation: Mutex<u64>,
}

impl DeploymentSlot {
    /// Start a new lookup: supersede any earlier one and show `Loading`
    pub fn begin(&self) -> u64 {
        self.replace(DeploymentLogState::Loading)
    }

    /// Reset to `Idle`, superseding any lookup in flight
    pub fn clear(&self) {
        self.replace(DeploymentLogState::Idle);
    }

    /// Publish the outcome of lookup `generation` unless it was superseded
    pub fn settle(&self, generation: u64, state: DeploymentLogState) -> bool {
        let current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != generation {
            debug!(generation, current = *current, "Dropping superseded deployment result");
            return false;
        }
        self.tx.send_modify(|snap| snap.deployment = state);
        true
    }

    fn replace(&self, state: DeploymentLogState) -> u64 {
        let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        self.tx.send_modify(|snap| snap.deployment = state);
        *current
    }
}

/// Writer for the `submitting` flag, owned by the submission path
#[derive(Debug)]
pub struct SubmitSlot {
    tx: Arc<watch::Sender<DashboardSnapshot>>,
}

impl SubmitSlot {
    /// Raise the flag unless a submission is already in flight
    ///
    /// The flag drops again when the guard goes out of scope.
    pub fn try_begin(&self) -> Option<SubmitGuard<'_>> {
        let raised = self.tx.send_if_modified(|snap| {
            if snap.submitting {
                false
            } else {
                snap.submitting = true;
                true
            }
        });
        if raised {
            Some(SubmitGuard { slot: self })
        } else {
            None
        }
    }
}

/// Keeps `submitting` raised while alive
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    slot: &'a SubmitSlot,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.slot.tx.send_modify(|snap| snap.submitting = false);
    }
}
