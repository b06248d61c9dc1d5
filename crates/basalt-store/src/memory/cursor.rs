use std::ops::Bound;
use std::sync::Arc;

use crate::store::Cursor;

use super::store::Keyspace;

/// Cursor over an immutable keyspace snapshot.
///
/// Tracks the current key and navigates via ordered-map range queries,
/// so every step is a logarithmic lookup against the snapshot.
pub struct MemoryCursor {
    data: Arc<Keyspace>,
    position: Option<Vec<u8>>,
}

impl MemoryCursor {
    pub(crate) fn new(data: Arc<Keyspace>) -> Self {
        Self {
            data,
            position: None,
        }
    }
}

impl Cursor for MemoryCursor {
    fn seek(&mut self, key: &[u8]) {
        self.position = self
            .data
            .range(key.to_vec()..)
            .next()
            .map(|(k, _)| k.clone());
    }

    fn seek_for_prev(&mut self, key: &[u8]) {
        self.position = self
            .data
            .range(..=key.to_vec())
            .next_back()
            .map(|(k, _)| k.clone());
    }

    fn seek_last(&mut self) {
        self.position = self.data.iter().next_back().map(|(k, _)| k.clone());
    }

    fn next(&mut self) {
        if let Some(current) = self.position.take() {
            self.position = self
                .data
                .range((Bound::Excluded(current), Bound::Unbounded))
                .next()
                .map(|(k, _)| k.clone());
        }
    }

    fn prev(&mut self) {
        if let Some(current) = self.position.take() {
            self.position = self
                .data
                .range(..current)
                .next_back()
                .map(|(k, _)| k.clone());
        }
    }

    fn valid(&self) -> bool {
        self.position.is_some()
    }

    fn key(&self) -> Option<&[u8]> {
        self.position.as_deref()
    }

    fn value(&self) -> Option<&[u8]> {
        let key = self.position.as_ref()?;
        self.data.get(key).map(|v| v.as_slice())
    }
}
