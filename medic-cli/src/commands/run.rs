//! Run command - validate and submit a new healing run

use std::path::PathBuf;

use clap::Args;
use medic_core::{AuthMode, Config, Error, RunRequest, Secrets};

use crate::render;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Repository to heal
    #[arg(long)]
    pub repo_url: String,

    /// Team name
    #[arg(long)]
    pub team: String,

    /// Team leader name
    #[arg(long)]
    pub leader: String,

    /// How the agent reaches the repository (https or ssh)
    #[arg(long, default_value = "https")]
    pub auth_mode: AuthMode,

    /// GitHub token (defaults to GITHUB_TOKEN or secrets.toml)
    #[arg(long)]
    pub github_token: Option<String>,

    /// File holding the SSH private key (ssh mode)
    #[arg(long)]
    pub private_key_file: Option<PathBuf>,

    /// Deployment provider token (defaults to VERCEL_TOKEN or secrets.toml)
    #[arg(long)]
    pub deployment_token: Option<String>,

    /// Keep watching the run after it is accepted
    #[arg(short, long)]
    pub watch: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let draft = self.draft(&secrets)?;
        let deployment_token = self
            .deployment_token
            .clone()
            .or_else(|| secrets.deployment_token());

        if verbose {
            tracing::info!(
                repo_url = %draft.repo_url,
                auth_mode = %self.auth_mode,
                has_github_token = !draft.github_token.is_empty(),
                has_private_key = draft.private_key.is_some(),
                "Preparing run"
            );
        }

        let dashboard = super::mount(config)?;

        let submission = match dashboard.submit(&draft, self.auth_mode, deployment_token).await {
            Ok(submission) => submission,
            Err(Error::Validation(problems)) => {
                dashboard.shutdown().await;
                eprintln!("Run not submitted:");
                for problem in &problems {
                    eprintln!("  - {}", problem);
                }
                anyhow::bail!("{} validation problem(s)", problems.len());
            }
            Err(e) => {
                dashboard.shutdown().await;
                return Err(anyhow::anyhow!("Failed to start run: {}", e));
            }
        };

        println!("Medic Run");
        println!("=========");
        println!();
        println!("Repository: {}", submission.request.repo_url);
        println!("Team:       {}", submission.request.team_name);
        println!("Leader:     {}", submission.request.leader_name);
        println!("Auth mode:  {}", submission.request.auth_mode);
        println!();
        println!("{}", submission.accepted.message);

        for advisory in &submission.advisories {
            println!("Warning: {}", advisory);
        }

        if self.watch {
            println!();
            return super::watch::follow(dashboard).await;
        }

        // Give the deployment lookup started with the submission a chance to land
        let mut rx = dashboard.subscribe();
        let panel = match tokio::time::timeout(
            config.sync.request_timeout,
            rx.wait_for(|snapshot| !snapshot.deployment.is_loading()),
        )
        .await
        {
            Ok(Ok(snapshot)) => render::deployment_panel(&snapshot.deployment),
            _ => None,
        };
        if let Some(panel) = panel {
            println!();
            print!("{}", panel);
        }

        dashboard.shutdown().await;
        Ok(())
    }

    /// Assemble the draft from flags, secrets and the key file
    fn draft(&self, secrets: &Secrets) -> anyhow::Result<RunRequest> {
        let mut draft = RunRequest::new(&self.repo_url, &self.team, &self.leader)
            .with_auth_mode(self.auth_mode);

        if let Some(token) = self.github_token.clone().or_else(|| secrets.github_token()) {
            draft = draft.with_github_token(token);
        }

        if let Some(path) = &self.private_key_file {
            let key = std::fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read private key {}: {}", path.display(), e)
            })?;
            draft = draft.with_private_key(key);
        }

        Ok(draft)
    }
}
