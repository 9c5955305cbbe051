//! Monitor Active Bets
//!
//! Subscribes every active bet to the "bet executed" event and logs each
//! execution. The list of active bets is refreshed on the poll interval.
//!
//! Usage:
//!   BETS_API_TOKEN=<token> cargo run --bin monitor_active_bets

use bets_monitor::bets::{init_tracing, BetsApi, BetsMonitor, EventKind, ShutdownManager};
use bets_monitor::bin_common::load_config;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.log_level);
    config.log();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let api = BetsApi::new(config.clone())?;
    let monitor = BetsMonitor::with_interval(api.clone(), config.poll_interval());

    monitor.set_callback(EventKind::BetExecuted, |bet| async move {
        info!(
            "Bet executed: [{}] {}",
            bet.id,
            bet.description.as_deref().unwrap_or_default()
        );
    });

    let handle = monitor.start_with_token(shutdown.child_token())?;

    info!("");
    info!("========================================");
    info!("Monitoring active bets");
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");

    while shutdown.is_running() {
        match api.fetch_active().await {
            Ok(bets) => {
                let added = monitor.subscribe(EventKind::BetExecuted, bets.iter().map(|b| b.id));
                if added > 0 {
                    info!("Watching {} new active bets", added);
                }
            }
            Err(e) => warn!("Failed to fetch active bets: {}", e),
        }

        shutdown.interruptible_sleep(config.poll_interval()).await;
    }

    handle.join().await;
    info!("Monitor stopped gracefully");
    Ok(())
}
