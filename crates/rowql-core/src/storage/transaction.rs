//! Snapshot transactions.

use tracing::debug;

use super::store::{RecordStore, Tables};

/// A unit of work over a store.
///
/// The store state is captured when the transaction begins. Unless
/// [`commit`](Self::commit) is called, dropping the transaction restores
/// that state, which lets tests seed a fixture and discard it afterwards.
///
/// Changes are applied to the store directly, so other readers see them
/// before commit.
pub struct Transaction<'a> {
    store: &'a RecordStore,
    snapshot: Option<(Tables, u64)>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(store: &'a RecordStore) -> Self {
        debug!("beginning transaction");
        Self {
            store,
            snapshot: Some(store.snapshot()),
        }
    }

    /// The store this transaction writes to.
    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// Keep all changes made since the transaction began.
    pub fn commit(mut self) {
        debug!("committing transaction");
        self.snapshot = None;
    }

    /// Discard all changes made since the transaction began.
    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if let Some((tables, next_id)) = self.snapshot.take() {
            debug!("rolling back transaction");
            self.store.restore(tables, next_id);
        }
    }
}

impl std::ops::Deref for Transaction<'_> {
    type Target = RecordStore;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}
