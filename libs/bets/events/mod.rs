//! Bet event subscriptions
//!
//! Register a callback per [`EventKind`], subscribe bet ids, then start the
//! monitor. Each kind is polled by its own task; once a watched bet is seen
//! in the terminal state it leaves the watch set and the callback runs once
//! for it.
//!
//! ```rust,ignore
//! let monitor = BetsMonitor::new(api);
//! monitor.set_callback(EventKind::BetExecuted, |bet| async move {
//!     tracing::info!("Bet executed: {}", bet.id);
//! });
//! monitor.subscribe(EventKind::BetExecuted, [1, 2, 3]);
//!
//! let handle = monitor.start()?;
//! // ...
//! handle.stop().await;
//! ```

mod callbacks;
mod kind;
mod monitor;
mod source;
mod subscriptions;

pub use callbacks::{Callback, CallbackRegistry};
pub use kind::EventKind;
pub use monitor::{BetsMonitor, MonitorError, MonitorHandle, TickOutcome};
pub use source::BetSource;
pub use subscriptions::SubscriptionSet;
