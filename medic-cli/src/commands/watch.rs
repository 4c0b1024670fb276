//! Watch command - live dashboard until Ctrl-C

use medic_core::{Config, Dashboard};

use crate::render;

/// Mount a session and print a frame on every change
pub async fn execute(verbose: bool, config: &Config) -> anyhow::Result<()> {
    if verbose {
        tracing::info!(
            base_url = %config.api.base_url,
            poll_interval = ?config.sync.poll_interval,
            "Watching agent status"
        );
    }

    let dashboard = super::mount(config)?;
    follow(dashboard).await
}

/// Print frames from an already mounted session until Ctrl-C
///
/// The session is always torn down before returning.
pub async fn follow(dashboard: Dashboard) -> anyhow::Result<()> {
    println!("Watching agent status (Ctrl-C to stop)");
    println!();

    let mut rx = dashboard.subscribe();
    let first = rx.borrow_and_update().clone();
    print!("{}", render::frame(&first));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                break signal.map_err(|e| anyhow::anyhow!("Failed to listen for Ctrl-C: {}", e));
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snapshot = rx.borrow_and_update().clone();
                println!();
                println!("----------------------------------------");
                print!("{}", render::frame(&snapshot));
            }
        }
    };

    dashboard.shutdown().await;
    println!();
    println!("Stopped watching.");
    result
}
