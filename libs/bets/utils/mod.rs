//! Common utilities for long-running bets processes

mod logging;
mod shutdown;

pub use logging::init_tracing;
pub use shutdown::ShutdownManager;
