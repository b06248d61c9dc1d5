pub mod codec;
mod element;
mod error;
mod factory;
pub mod failpoint;
mod index;
mod iterator;
mod matcher;
mod planner;
mod specializer;

pub use error::IndexError;
pub use factory::SearchValue;
pub use index::{IndexDescriptor, PersistentIndex};
pub use iterator::{DocumentIterator, IndexIterator, MultiIndexIterator, PrimaryIndex};
pub use planner::{FilterCosts, SortCosts};
