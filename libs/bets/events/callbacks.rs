//! Callback registry

use super::kind::EventKind;
use crate::client::Bet;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Async callback invoked with the bet that changed
pub type Callback = Arc<dyn Fn(Bet) -> BoxFuture<'static, ()> + Send + Sync>;

/// One callback per event kind, last registration wins
#[derive(Default)]
pub struct CallbackRegistry {
    inner: RwLock<HashMap<EventKind, Callback>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `kind`, replacing any previous one
    pub fn set<F, Fut>(&self, kind: EventKind, callback: F)
    where
        F: Fn(Bet) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: Callback = Arc::new(move |bet| callback(bet).boxed());
        self.inner.write().insert(kind, callback);
    }

    /// Drop the callback of `kind`; returns whether one was set
    pub fn clear(&self, kind: EventKind) -> bool {
        self.inner.write().remove(&kind).is_some()
    }

    pub fn get(&self, kind: EventKind) -> Option<Callback> {
        self.inner.read().get(&kind).cloned()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.inner.read().keys()).finish()
    }
}
