use std::fmt;

use basalt_store::StoreError;

#[derive(Debug)]
pub enum IndexError {
    Store(StoreError),
    UniqueViolation,
    Encoding(String),
    InvalidDocument(String),
    Internal(String),
    /// An armed failure point fired (see [`crate::failpoint`]).
    Debug(&'static str),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Store(e) => write!(f, "store error: {e}"),
            IndexError::UniqueViolation => write!(f, "unique constraint violated"),
            IndexError::Encoding(msg) => write!(f, "encoding error: {msg}"),
            IndexError::InvalidDocument(msg) => write!(f, "invalid document: {msg}"),
            IndexError::Internal(msg) => write!(f, "internal error: {msg}"),
            IndexError::Debug(name) => write!(f, "injected failure: {name}"),
        }
    }
}

impl std::error::Error for IndexError {}

impl From<StoreError> for IndexError {
    fn from(e: StoreError) -> Self {
        IndexError::Store(e)
    }
}
