mod expr;
mod path;
mod sort;

pub use expr::{Comparison, ComparisonOp, Operand, Predicate};
pub use path::{AttributePath, PathSegment};
pub use sort::{SortCondition, SortDirection, SortField};
