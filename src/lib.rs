//! Bets Monitor - Main Library
//!
//! ## Architecture
//!
//! - **bets**: API client and event monitor (re-exported from workspace)
//! - **bin_common**: Common utilities for binary executables
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use bets_monitor::bin_common::load_config;
//! use bets_monitor::bets::{BetsApi, BetsMonitor};
//! ```

// Re-export workspace libraries for convenience
pub use bets;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{config_path_from_env, load_config, CONFIG_PATH_ENV};
}
