//! CLI command implementations

pub mod deployment;
pub mod run;
pub mod status;
pub mod watch;

use std::sync::Arc;

use medic_api::ApiClient;
use medic_core::{Config, Dashboard, Sources};

pub use deployment::DeploymentArgs;
pub use run::RunArgs;

/// Build a backend client from the effective configuration
fn connect(config: &Config) -> anyhow::Result<Arc<ApiClient>> {
    let client = ApiClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("Failed to create backend client: {}", e))?;
    Ok(Arc::new(client))
}

/// Mount a dashboard session against the configured backend
fn mount(config: &Config) -> anyhow::Result<Dashboard> {
    let client = connect(config)?;
    Ok(Dashboard::mount(Sources::from_backend(client), config.sync))
}
