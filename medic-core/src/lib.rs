//! Medic Core - Status synchronization for the repository-healing dashboard
//!
//! This crate polls a remote healing agent for its run status, looks up
//! deployment logs for submitted repositories, validates new run requests,
//! and merges all of it into one snapshot for the presentation layer.

pub mod config;
pub mod error;
pub mod model;
pub mod scoring;
pub mod secrets;
pub mod sync;
pub mod validate;

pub use config::{ApiConfig, Config, SyncConfig};
pub use error::{Error, Result};
pub use model::{
    AuthMode, Deployment, DeploymentLogState, DeploymentLookup, DeploymentPanel, FinalStatus,
    Fix, FixOutcome, RunAccepted, RunPhase, RunRequest, RunStatus,
};
pub use secrets::Secrets;
pub use sync::{
    Dashboard, DashboardSnapshot, DeploymentSource, RunSubmitter, Sources, StatusSource,
    Submission,
};
pub use validate::{validate, Advisory, ValidatedRun, ValidationError};
