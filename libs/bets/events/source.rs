use crate::client::{ApiError, Bet, BetId, BetsApi};
use async_trait::async_trait;
use std::sync::Arc;

/// Upstream the monitor polls for the current state of watched bets
#[async_trait]
pub trait BetSource: Send + Sync + 'static {
    /// Current records of `ids`; unknown ids are left out
    async fn fetch_by_ids(&self, ids: &[BetId]) -> Result<Vec<Bet>, ApiError>;
}

#[async_trait]
impl BetSource for BetsApi {
    async fn fetch_by_ids(&self, ids: &[BetId]) -> Result<Vec<Bet>, ApiError> {
        BetsApi::fetch_by_ids(self, ids).await
    }
}

#[async_trait]
impl<S: BetSource> BetSource for Arc<S> {
    async fn fetch_by_ids(&self, ids: &[BetId]) -> Result<Vec<Bet>, ApiError> {
        self.as_ref().fetch_by_ids(ids).await
    }
}
