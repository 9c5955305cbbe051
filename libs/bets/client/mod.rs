//! Bets engine API client
//!
//! Reads and creates bets. Every call is authenticated with the
//! `Authorization: Token <token>` header and fails with [`ApiError`]
//! on timeout, non-JSON bodies or a status other than `ok`.

mod api;
mod create;
mod error;
mod types;

pub use api::{BetsApi, DEFAULT_MAX_PAGES};
pub use create::{BetType, MinStakes, NewBet, ACCEPT_END_FORMAT, DATE_FORMAT};
pub use error::{ApiError, Result};
pub use types::{
    Bet, BetId, BetState, Side, Stake, StakeRecord, StakeSummary, STAKE_TIME_FORMAT,
};
