//! Bets Engine Client
//!
//! Wrapper over the bets engine HTTP JSON API plus a polling monitor that
//! fires callbacks when watched bets change state.
//!
//! # Example
//!
//! ```rust,ignore
//! use bets::{BetsApi, BetsConfig, BetsMonitor, EventKind};
//!
//! let api = BetsApi::new(BetsConfig::with_token("<token>"))?;
//! let active = api.fetch_active().await?;
//!
//! let monitor = BetsMonitor::new(api);
//! monitor.set_callback(EventKind::BetExecuted, |bet| async move {
//!     println!("Bet executed: [{}] {}", bet.id, bet.description.unwrap_or_default());
//! });
//! monitor.subscribe(EventKind::BetExecuted, active.iter().map(|b| b.id));
//! let handle = monitor.start()?;
//! ```

pub mod client;
pub mod config;
pub mod events;
pub mod utils;

// Re-export commonly used items
pub use client::{
    ApiError, Bet, BetId, BetState, BetType, BetsApi, MinStakes, NewBet, Side, Stake,
    StakeSummary,
};
pub use config::{BetsConfig, ConfigError};
pub use events::{BetSource, BetsMonitor, EventKind, MonitorError, MonitorHandle, TickOutcome};
pub use utils::{init_tracing, ShutdownManager};
