//! Status command - one status read

use chrono::Utc;
use medic_core::Config;

use crate::render;

/// Fetch the run status once and print it
pub async fn execute(verbose: bool, config: &Config) -> anyhow::Result<()> {
    let client = super::connect(config)?;

    let run = client
        .get_status()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch status from {}: {}", config.api.base_url, e))?;

    if verbose {
        tracing::info!(
            status = %run.status,
            iteration = run.iteration,
            logs = run.logs.len(),
            "Status fetched"
        );
    }

    println!();
    print!("{}", render::run_summary(&run, Some(Utc::now())));
    println!();
    print!("{}", render::score_panel(&run));
    println!();
    print!("{}", render::fixes_table(&run));
    println!();
    print!("{}", render::timeline(&run.logs));

    Ok(())
}
