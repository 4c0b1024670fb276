//! Data contracts shared by the poller, the deployment fetcher and the CLI

mod deployment;
mod request;
mod run;

pub use deployment::{Deployment, DeploymentLogState, DeploymentLookup, DeploymentPanel};
pub use request::{RunAccepted, RunRequest};
pub use run::{AuthMode, FinalStatus, Fix, FixOutcome, RunPhase, RunStatus, NO_BRANCH};
