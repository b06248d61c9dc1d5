use std::cell::{Cell, RefCell};
use std::sync::{Arc, MutexGuard};

use crate::error::StoreError;
use crate::store::Transaction;

use super::cursor::MemoryCursor;
use super::store::{Keyspace, MemoryStore};

pub struct MemoryTransaction<'a> {
    data: RefCell<Arc<Keyspace>>,
    dirty: Cell<bool>,
    store: &'a MemoryStore,
    read_only: bool,
    /// Write lock held for the duration of a write transaction.
    _write_guard: Option<MutexGuard<'a, ()>>,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new_read_only(store: &'a MemoryStore) -> Self {
        Self {
            data: RefCell::new(store.snapshot()),
            dirty: Cell::new(false),
            store,
            read_only: true,
            _write_guard: None,
        }
    }

    pub(crate) fn new_writable(store: &'a MemoryStore, guard: MutexGuard<'a, ()>) -> Self {
        Self {
            data: RefCell::new(store.snapshot()),
            dirty: Cell::new(false),
            store,
            read_only: false,
            _write_guard: Some(guard),
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

impl Transaction for MemoryTransaction<'_> {
    type Cursor<'c>
        = MemoryCursor
    where
        Self: 'c;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn cursor(&self) -> Result<Self::Cursor<'_>, StoreError> {
        // The cursor iterates the snapshot taken here; later writes in
        // this transaction are not reflected in an already-open cursor.
        Ok(MemoryCursor::new(Arc::clone(&self.data.borrow())))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.dirty.set(true);
        Arc::make_mut(&mut *self.data.borrow_mut()).insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.dirty.set(true);
        Arc::make_mut(&mut *self.data.borrow_mut()).remove(key);
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        if self.dirty.get() {
            self.store.publish(self.data.into_inner());
        }
        Ok(())
    }

    fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
