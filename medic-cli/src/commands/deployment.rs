//! Deployment command - one deployment-log lookup

use clap::Args;
use medic_core::{Config, DeploymentLogState, Secrets};

use crate::render;

/// Arguments for the deployment command
#[derive(Args, Debug)]
pub struct DeploymentArgs {
    /// Repository whose latest deployment to show
    #[arg(long)]
    pub repo_url: String,

    /// Deployment provider token (defaults to VERCEL_TOKEN or secrets.toml)
    #[arg(long)]
    pub deployment_token: Option<String>,
}

impl DeploymentArgs {
    /// Execute the deployment command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let repo_url = self.repo_url.trim();
        if repo_url.is_empty() {
            anyhow::bail!("--repo-url must not be empty");
        }

        let token = match &self.deployment_token {
            Some(token) => Some(token.clone()),
            None => Secrets::load()?.deployment_token(),
        };
        let token = token.filter(|t| !t.trim().is_empty());

        if verbose {
            tracing::info!(repo_url, has_token = token.is_some(), "Looking up deployment");
        }

        let client = super::connect(config)?;
        let state = match client.get_deployment_logs(repo_url, token.as_deref()).await {
            Ok(lookup) => DeploymentLogState::from(lookup),
            Err(e) => {
                tracing::warn!(error = %e, "Deployment lookup failed");
                DeploymentLogState::Idle
            }
        };

        match render::deployment_panel(&state) {
            Some(panel) => print!("{}", panel),
            None => println!("No deployment found for {}", repo_url),
        }

        Ok(())
    }
}
