use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::path::AttributePath;

/// Binary comparison operators understood by index planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
}

/// One side of a comparison: an attribute access on a named variable, or
/// a constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Attribute {
        variable: String,
        path: AttributePath,
    },
    Value(Bson),
}

impl Operand {
    pub fn attribute(variable: impl Into<String>, path: &str) -> Self {
        Operand::Attribute {
            variable: variable.into(),
            path: AttributePath::parse(path),
        }
    }

    pub fn value(value: impl Into<Bson>) -> Self {
        Operand::Value(value.into())
    }

    /// The attribute path, if this operand is an access on `variable`.
    pub fn attribute_for(&self, variable: &str) -> Option<&AttributePath> {
        match self {
            Operand::Attribute { variable: v, path } if v == variable => Some(path),
            _ => None,
        }
    }

    /// The constant value, if this operand is one.
    pub fn constant(&self) -> Option<&Bson> {
        match self {
            Operand::Value(value) => Some(value),
            Operand::Attribute { .. } => None,
        }
    }
}

/// A binary comparison between two operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub op: ComparisonOp,
    pub lhs: Operand,
    pub rhs: Operand,
}

impl Comparison {
    pub fn new(op: ComparisonOp, lhs: Operand, rhs: Operand) -> Self {
        Self { op, lhs, rhs }
    }
}

/// A conjunction of binary comparisons over one collection variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub comparisons: Vec<Comparison>,
}

impl Predicate {
    pub fn and(comparisons: Vec<Comparison>) -> Self {
        Self { comparisons }
    }
}
