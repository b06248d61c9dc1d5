use bson::Document;
use serde::{Deserialize, Serialize};

use basalt_query::AttributePath;
use basalt_store::Transaction;

use crate::codec;
use crate::element;
use crate::error::IndexError;

/// Immutable description of a persistent index, as stored in the
/// collection catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Identifies the index within its collection; the key prefix of
    /// every entry.
    pub id: u64,
    /// Indexed attribute paths, in significance order.
    pub fields: Vec<AttributePath>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub sparse: bool,
}

impl IndexDescriptor {
    pub fn new(id: u64, fields: Vec<AttributePath>) -> Self {
        Self {
            id,
            fields,
            unique: false,
            sparse: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }
}

/// A secondary index persisted in an ordered KV store.
///
/// Entry keys encode `(id, v1, .., vn)` so that byte order equals tuple
/// order; the stored value is the encoded primary key of the owning
/// document. Every operation runs inside a caller-provided store
/// transaction; the index itself holds no mutable state.
pub struct PersistentIndex {
    descriptor: IndexDescriptor,
    uses_expansion: bool,
}

impl PersistentIndex {
    pub fn new(descriptor: IndexDescriptor) -> Self {
        let uses_expansion = descriptor.fields.iter().any(AttributePath::has_expansion);
        Self {
            descriptor,
            uses_expansion,
        }
    }

    pub fn descriptor(&self) -> &IndexDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> u64 {
        self.descriptor.id
    }

    pub fn fields(&self) -> &[AttributePath] {
        &self.descriptor.fields
    }

    pub fn is_unique(&self) -> bool {
        self.descriptor.unique
    }

    pub fn is_sparse(&self) -> bool {
        self.descriptor.sparse
    }

    pub fn uses_expansion(&self) -> bool {
        self.uses_expansion
    }

    pub(crate) fn field_is_expanded(&self, i: usize) -> bool {
        self.descriptor.fields[i].has_expansion()
    }

    /// Encoded entry keys for every tuple `doc` contributes.
    fn entry_keys(&self, doc: &Document) -> Result<Vec<Vec<u8>>, IndexError> {
        element::build_tuples(doc, &self.descriptor.fields, self.descriptor.sparse)
            .iter()
            .map(|tuple| codec::entry_key(self.descriptor.id, tuple))
            .collect()
    }

    fn primary_key(doc: &Document) -> Result<Vec<u8>, IndexError> {
        let id = doc
            .get("_id")
            .ok_or_else(|| IndexError::InvalidDocument("missing _id".into()))?;
        codec::value_bytes(id)
    }

    /// Insert the entries for `doc`.
    ///
    /// All entries are written or none: a unique violation or a store
    /// failure deletes whatever this call already wrote before the error
    /// is returned. The unique probe and the subsequent put are not
    /// atomic; concurrent writers need an exclusive lock above this
    /// layer for uniqueness to be authoritative.
    pub fn insert<T: Transaction>(&self, txn: &T, doc: &Document) -> Result<(), IndexError> {
        let keys = self.entry_keys(doc)?;
        let primary_key = Self::primary_key(doc)?;

        for (i, key) in keys.iter().enumerate() {
            let mut result = Ok(());

            if self.descriptor.unique {
                match txn.get(key) {
                    Ok(Some(_)) => result = Err(IndexError::UniqueViolation),
                    Ok(None) => {}
                    Err(e) => result = Err(IndexError::Store(e)),
                }
            }

            if result.is_ok() {
                if let Err(e) = txn.put(key, &primary_key) {
                    result = Err(IndexError::Store(e));
                }
            }

            if let Err(error) = result {
                // best-effort compensation of the entries written so far
                for written in &keys[..i] {
                    let _ = txn.delete(written);
                }
                if matches!(error, IndexError::UniqueViolation) && !self.descriptor.unique {
                    // unreachable while the probe above is gated on
                    // `unique`; a non-unique index tolerates duplicates
                    return Ok(());
                }
                return Err(error);
            }
        }

        Ok(())
    }

    /// Delete every entry `doc` contributes.
    ///
    /// Keeps deleting after a failure so no residual entries survive a
    /// partially failing remove; the first error is returned once all
    /// keys have been attempted.
    pub fn remove<T: Transaction>(&self, txn: &T, doc: &Document) -> Result<(), IndexError> {
        let keys = self.entry_keys(doc)?;

        let mut first_error = None;
        for key in &keys {
            if let Err(e) = txn.delete(key) {
                first_error.get_or_insert(IndexError::Store(e));
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
