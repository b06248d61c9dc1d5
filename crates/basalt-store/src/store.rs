use crate::error::StoreError;

/// An ordered key-value store.
///
/// Keys are raw byte strings compared lexicographically. All access goes
/// through a [`Transaction`] obtained from [`begin`](Store::begin); a
/// transaction sees a stable view of the keyspace for its lifetime.
pub trait Store {
    type Txn<'a>: Transaction
    where
        Self: 'a;

    fn begin(&self, read_only: bool) -> Result<Self::Txn<'_>, StoreError>;
}

pub trait Transaction {
    type Cursor<'c>: Cursor
    where
        Self: 'c;

    // Reads
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Open a cursor over the transaction's current view of the keyspace.
    fn cursor(&self) -> Result<Self::Cursor<'_>, StoreError>;

    // Writes
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    // Lifecycle
    fn commit(self) -> Result<(), StoreError>;
    fn rollback(self) -> Result<(), StoreError>;
}

/// A positioned iterator over the keyspace in byte-lexicographic order.
///
/// A cursor starts unpositioned; one of the seek operations must run
/// before `key`/`value` return anything. Stepping off either end of the
/// keyspace leaves the cursor invalid.
pub trait Cursor {
    /// Position at the first entry with key `>= key`.
    fn seek(&mut self, key: &[u8]);

    /// Position at the last entry with key `<= key`.
    fn seek_for_prev(&mut self, key: &[u8]);

    /// Position at the last entry in the keyspace.
    fn seek_last(&mut self);

    /// Step to the next entry in ascending key order.
    fn next(&mut self);

    /// Step to the previous entry in ascending key order.
    fn prev(&mut self);

    /// Whether the cursor is positioned on an entry.
    fn valid(&self) -> bool;

    fn key(&self) -> Option<&[u8]>;
    fn value(&self) -> Option<&[u8]>;
}
