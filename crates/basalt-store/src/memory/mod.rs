mod cursor;
mod store;
mod transaction;

pub use cursor::MemoryCursor;
pub use store::MemoryStore;
pub use transaction::MemoryTransaction;
