//! Bridge between route-loaded data and a long-lived store.
//!
//! The view owner calls [`SyncBridge::on_data_received`] each time its loader
//! produces data. The store is overwritten only when the snapshot differs from
//! the last one applied; the first comparison is against the seed the store
//! was built with. The store instance, its `loading`/`error` flags and its
//! subscribers are never replaced.
//!
//! Race policy for a snapshot that lands while a toggle is in flight: merge by
//! id, pending wins. See [`TodoStore::apply_snapshot`].

use crate::repository::TodoRepository;
use crate::store::TodoStore;
use crate::types::Todo;

#[derive(Debug, Clone, Default)]
pub struct SyncBridge {
    last: Vec<Todo>,
}

impl SyncBridge {
    /// `seed` is the data the store was constructed with.
    pub fn new(seed: Vec<Todo>) -> Self {
        Self { last: seed }
    }

    /// Returns `true` if the snapshot was applied.
    pub fn on_data_received<R: TodoRepository>(
        &mut self,
        store: &TodoStore<R>,
        snapshot: &[Todo],
    ) -> bool {
        if self.last.as_slice() == snapshot {
            return false;
        }
        tracing::debug!(items = snapshot.len(), "route data changed, syncing store");
        self.last = snapshot.to_vec();
        store.apply_snapshot(snapshot.to_vec());
        true
    }
}
