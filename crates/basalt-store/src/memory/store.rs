use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use imbl::OrdMap;

use crate::error::StoreError;
use crate::store::Store;

use super::transaction::MemoryTransaction;

pub(crate) type Keyspace = OrdMap<Vec<u8>, Vec<u8>>;

/// In-memory ordered store backed by a persistent ordered map.
///
/// Readers load a snapshot that stays stable for the life of their
/// transaction; a writer mutates a private copy of the map and publishes
/// it atomically on commit. Only one write transaction exists at a time.
pub struct MemoryStore {
    data: ArcSwap<Keyspace>,
    write_lock: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            data: ArcSwap::new(Arc::new(OrdMap::new())),
            write_lock: Mutex::new(()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn acquire_write_lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::Storage(format!("write lock poisoned: {e}")))
    }

    pub(crate) fn snapshot(&self) -> Arc<Keyspace> {
        self.data.load_full()
    }

    /// Publish a writer's keyspace. The caller must hold the write lock,
    /// so no conflict detection is needed.
    pub(crate) fn publish(&self, data: Arc<Keyspace>) {
        self.data.store(data);
    }
}

impl Store for MemoryStore {
    type Txn<'a>
        = MemoryTransaction<'a>
    where
        Self: 'a;

    fn begin(&self, read_only: bool) -> Result<Self::Txn<'_>, StoreError> {
        if read_only {
            Ok(MemoryTransaction::new_read_only(self))
        } else {
            let guard = self.acquire_write_lock()?;
            Ok(MemoryTransaction::new_writable(self, guard))
        }
    }
}
