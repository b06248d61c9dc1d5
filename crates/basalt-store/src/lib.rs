mod error;
mod store;

pub use error::StoreError;
pub use store::{Cursor, Store, Transaction};

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::{MemoryCursor, MemoryStore, MemoryTransaction};
