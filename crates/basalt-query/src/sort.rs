use serde::{Deserialize, Serialize};

use crate::expr::Operand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    pub operand: Operand,
    pub direction: SortDirection,
}

/// An ordered list of sort keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortCondition {
    pub fields: Vec<SortField>,
}

impl SortCondition {
    pub fn new(fields: Vec<SortField>) -> Self {
        Self { fields }
    }

    pub fn num_attributes(&self) -> usize {
        self.fields.len()
    }

    /// All keys sort the same way.
    pub fn is_unidirectional(&self) -> bool {
        self.fields
            .windows(2)
            .all(|pair| pair[0].direction == pair[1].direction)
    }

    /// Every key is a plain attribute access (no computed expressions).
    pub fn is_only_attribute_access(&self) -> bool {
        self.fields
            .iter()
            .all(|f| matches!(f.operand, Operand::Attribute { .. }))
    }

    pub fn is_descending(&self) -> bool {
        self.fields
            .first()
            .is_some_and(|f| f.direction == SortDirection::Desc)
    }
}
