//! Watched bet ids per event kind

use super::kind::EventKind;
use crate::client::BetId;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Set of watched bet ids for every event kind
///
/// Callers only ever add; the poller of a kind is the only one removing
/// resolved ids. The lock is held for single set operations only.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    inner: Mutex<HashMap<EventKind, HashSet<BetId>>>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `ids` into the watch set of `kind`
    ///
    /// Returns how many ids were not watched before.
    pub fn subscribe(&self, kind: EventKind, ids: impl IntoIterator<Item = BetId>) -> usize {
        let mut inner = self.inner.lock();
        let watched = inner.entry(kind).or_default();
        ids.into_iter().filter(|id| watched.insert(*id)).count()
    }

    /// Remove `ids` from the watch set of `kind`
    ///
    /// Returns the ids that were watched and are now gone, each once.
    pub fn remove(&self, kind: EventKind, ids: impl IntoIterator<Item = BetId>) -> Vec<BetId> {
        let mut inner = self.inner.lock();
        match inner.get_mut(&kind) {
            Some(watched) => ids.into_iter().filter(|id| watched.remove(id)).collect(),
            None => Vec::new(),
        }
    }

    /// Watched ids of `kind` in ascending order
    pub fn snapshot(&self, kind: EventKind) -> Vec<BetId> {
        let inner = self.inner.lock();
        let mut ids: Vec<BetId> = inner
            .get(&kind)
            .map(|watched| watched.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    pub fn watched(&self, kind: EventKind) -> HashSet<BetId> {
        self.inner.lock().get(&kind).cloned().unwrap_or_default()
    }

    pub fn contains(&self, kind: EventKind, id: BetId) -> bool {
        self.inner
            .lock()
            .get(&kind)
            .is_some_and(|watched| watched.contains(&id))
    }

    pub fn len(&self, kind: EventKind) -> usize {
        self.inner.lock().get(&kind).map_or(0, HashSet::len)
    }

    pub fn is_empty(&self, kind: EventKind) -> bool {
        self.len(kind) == 0
    }
}
