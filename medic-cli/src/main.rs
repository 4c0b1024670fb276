//! Medic CLI - Command line dashboard for the repository-healing agent
//!
//! Watches run status, submits new runs and shows deployment logs.

mod commands;
mod render;

use std::time::Duration;

use clap::{Parser, Subcommand};
use humantime_serde::re::humantime;
use medic_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{DeploymentArgs, RunArgs};

/// Medic: observe and drive an autonomous repository-healing agent
#[derive(Parser, Debug)]
#[command(name = "medic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Agent backend base URL (overrides config and env)
    #[arg(long, global = true, env = "MEDIC_BASE_URL")]
    base_url: Option<String>,

    /// Status poll interval, e.g. "2s" (overrides config and env)
    #[arg(long, global = true, value_parser = parse_interval)]
    poll_interval: Option<Duration>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Watch the agent's run status until Ctrl-C
    #[command(visible_alias = "w")]
    Watch,

    /// Fetch and print the current run status once
    Status,

    /// Submit a new healing run
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Show the latest deployment logs for a repository
    Deployment(DeploymentArgs),

    /// Show current configuration
    Config {
        /// Create a secrets.toml template with secure permissions
        #[arg(long)]
        init_secrets: bool,
    },
}

fn parse_interval(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|e| format!("invalid duration '{}': {}", value, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so frames on stdout stay clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.base_url.clone(), cli.poll_interval)?;

    if cli.verbose {
        tracing::info!(
            base_url = %config.api.base_url,
            poll_interval = ?config.sync.poll_interval,
            request_timeout = ?config.sync.request_timeout,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("medic {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Watch) => {
            commands::watch::execute(cli.verbose, &config).await?;
        }
        Some(Commands::Status) => {
            commands::status::execute(cli.verbose, &config).await?;
        }
        Some(Commands::Run(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Deployment(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config { init_secrets }) => {
            print_config(&config, init_secrets)?;
        }
        None => {
            println!("Medic - Dashboard for the repository-healing agent");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, init_secrets: bool) -> anyhow::Result<()> {
    println!("Medic Configuration");
    println!("===================");
    println!();
    println!("API Settings:");
    println!("  base_url: {}", config.api.base_url);
    println!("  status_path: {}", config.api.status_path);
    println!("  start_run_path: {}", config.api.start_run_path);
    println!("  deployment_logs_path: {}", config.api.deployment_logs_path);
    println!();
    println!("Sync Settings:");
    println!(
        "  poll_interval: {}",
        humantime::format_duration(config.sync.poll_interval)
    );
    println!(
        "  request_timeout: {}",
        humantime::format_duration(config.sync.request_timeout)
    );
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }

    if init_secrets {
        let path = Secrets::create_template()?;
        println!("Secrets file: {} (created)", path.display());
    } else if let Some(path) = Secrets::default_secrets_path() {
        println!("Secrets file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - run `medic config --init-secrets`)");
        }
    }

    Ok(())
}
