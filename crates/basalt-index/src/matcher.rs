use std::collections::HashMap;

use bson::Bson;

use basalt_query::{Comparison, ComparisonOp, Predicate};

use crate::index::PersistentIndex;

/// Which side of a comparison held the document attribute access.
///
/// Carrying the side lets the factory flip range operators matched as
/// `value OP doc.attr` instead of duplicating the symmetric logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessSide {
    Left,
    Right,
}

/// A comparison attributed to one index field.
#[derive(Debug, Clone)]
pub(crate) struct MatchedComparison {
    pub comparison: Comparison,
    pub side: AccessSide,
}

impl MatchedComparison {
    pub fn op(&self) -> ComparisonOp {
        self.comparison.op
    }

    /// The constant operand, i.e. the side that is not the attribute.
    pub fn constant(&self) -> Option<&Bson> {
        let operand = match self.side {
            AccessSide::Left => &self.comparison.rhs,
            AccessSide::Right => &self.comparison.lhs,
        };
        operand.constant()
    }

    pub fn is_equality(&self) -> bool {
        matches!(self.op(), ComparisonOp::Eq | ComparisonOp::In)
    }
}

/// Comparisons of a predicate attributed to index fields.
pub(crate) struct FieldMatches {
    /// Field position → matching comparisons, in predicate order.
    pub by_field: HashMap<usize, Vec<MatchedComparison>>,
    /// Extra scan multiplicity from IN lists (`len - 1` per list with
    /// two or more members).
    pub values: usize,
}

impl FieldMatches {
    pub fn field(&self, i: usize) -> Option<&Vec<MatchedComparison>> {
        self.by_field.get(&i)
    }
}

impl PersistentIndex {
    /// Attribute every usable comparison of `predicate` to an index
    /// field. `reference` names the collection document variable.
    pub(crate) fn match_attributes(&self, predicate: &Predicate, reference: &str) -> FieldMatches {
        let mut matches = FieldMatches {
            by_field: HashMap::new(),
            values: 0,
        };

        for comparison in &predicate.comparisons {
            match comparison.op {
                ComparisonOp::Eq
                | ComparisonOp::Lt
                | ComparisonOp::Le
                | ComparisonOp::Gt
                | ComparisonOp::Ge => {
                    self.access_fits_index(comparison, AccessSide::Left, reference, &mut matches);
                    self.access_fits_index(comparison, AccessSide::Right, reference, &mut matches);
                }
                ComparisonOp::In => {
                    if self.access_fits_index(comparison, AccessSide::Left, reference, &mut matches)
                    {
                        if let Some(Bson::Array(items)) = comparison.rhs.constant() {
                            if items.len() > 1 {
                                matches.values += items.len() - 1;
                            }
                        }
                    } else {
                        self.access_fits_index(
                            comparison,
                            AccessSide::Right,
                            reference,
                            &mut matches,
                        );
                    }
                }
            }
        }

        matches
    }

    /// Try to attribute `comparison`, with the attribute access taken
    /// from `side`, to one of this index's fields.
    fn access_fits_index(
        &self,
        comparison: &Comparison,
        side: AccessSide,
        reference: &str,
        matches: &mut FieldMatches,
    ) -> bool {
        let (access, other) = match side {
            AccessSide::Left => (&comparison.lhs, &comparison.rhs),
            AccessSide::Right => (&comparison.rhs, &comparison.lhs),
        };
        let Some(path) = access.attribute_for(reference) else {
            return false;
        };
        if other.constant().is_none() {
            // both sides reference documents; nothing to scan for
            return false;
        }

        match comparison.op {
            ComparisonOp::In => {
                // `doc.v IN <list>` serves a non-expanded field; the
                // flipped orientation `x IN doc.v.[]` serves an
                // expanded one.
                match side {
                    AccessSide::Left if path.has_expansion() => return false,
                    AccessSide::Right if !path.has_expansion() => return false,
                    _ => {}
                }
            }
            _ => {
                if path.has_expansion() {
                    return false;
                }
            }
        }

        for (i, field) in self.fields().iter().enumerate() {
            if self.field_is_expanded(i) && comparison.op != ComparisonOp::In {
                // an expanded field can only ever serve IN
                continue;
            }
            if field != path {
                continue;
            }
            matches.by_field.entry(i).or_default().push(MatchedComparison {
                comparison: comparison.clone(),
                side,
            });
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_query::{AttributePath, Operand};

    use crate::index::IndexDescriptor;

    fn index(fields: &[&str]) -> PersistentIndex {
        let fields = fields.iter().map(|f| AttributePath::parse(f)).collect();
        PersistentIndex::new(IndexDescriptor::new(1, fields))
    }

    fn cmp(op: ComparisonOp, lhs: Operand, rhs: Operand) -> Comparison {
        Comparison::new(op, lhs, rhs)
    }

    #[test]
    fn equality_matches_its_field() {
        let index = index(&["a", "b"]);
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::Eq,
            Operand::attribute("doc", "b"),
            Operand::value(5),
        )]);

        let matches = index.match_attributes(&predicate, "doc");
        assert!(matches.field(0).is_none());
        let matched = matches.field(1).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].side, AccessSide::Left);
        assert_eq!(matched[0].constant(), Some(&Bson::Int32(5)));
    }

    #[test]
    fn flipped_comparison_records_right_side() {
        let index = index(&["a"]);
        // 5 < doc.a
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::Lt,
            Operand::value(5),
            Operand::attribute("doc", "a"),
        )]);

        let matches = index.match_attributes(&predicate, "doc");
        let matched = matches.field(0).unwrap();
        assert_eq!(matched[0].side, AccessSide::Right);
        assert_eq!(matched[0].constant(), Some(&Bson::Int32(5)));
    }

    #[test]
    fn other_variable_does_not_match() {
        let index = index(&["a"]);
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::Eq,
            Operand::attribute("other", "a"),
            Operand::value(1),
        )]);
        assert!(index.match_attributes(&predicate, "doc").by_field.is_empty());
    }

    #[test]
    fn attribute_to_attribute_does_not_match() {
        let index = index(&["a"]);
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::Eq,
            Operand::attribute("doc", "a"),
            Operand::attribute("doc", "a"),
        )]);
        assert!(index.match_attributes(&predicate, "doc").by_field.is_empty());
    }

    #[test]
    fn in_list_counts_extra_values() {
        let index = index(&["a"]);
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::In,
            Operand::attribute("doc", "a"),
            Operand::value(vec![1, 2, 3]),
        )]);

        let matches = index.match_attributes(&predicate, "doc");
        assert!(matches.field(0).is_some());
        assert_eq!(matches.values, 2);
    }

    #[test]
    fn single_member_in_counts_nothing() {
        let index = index(&["a"]);
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::In,
            Operand::attribute("doc", "a"),
            Operand::value(vec![7]),
        )]);
        assert_eq!(index.match_attributes(&predicate, "doc").values, 0);
    }

    #[test]
    fn expanded_field_rejects_plain_equality() {
        let index = index(&["tags.[]"]);
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::Eq,
            Operand::attribute("doc", "tags"),
            Operand::value("x"),
        )]);
        assert!(index.match_attributes(&predicate, "doc").by_field.is_empty());
    }

    #[test]
    fn scalar_in_expanded_attribute_matches() {
        let index = index(&["tags.[]"]);
        // "x" IN doc.tags.[]
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::In,
            Operand::value("x"),
            Operand::attribute("doc", "tags.[]"),
        )]);

        let matches = index.match_attributes(&predicate, "doc");
        let matched = matches.field(0).unwrap();
        assert_eq!(matched[0].side, AccessSide::Right);
        assert_eq!(matched[0].constant(), Some(&Bson::String("x".into())));
        assert_eq!(matches.values, 0);
    }

    #[test]
    fn expanded_attribute_in_list_does_not_match() {
        let index = index(&["tags.[]"]);
        // doc.tags.[] IN [..] is not a supported shape
        let predicate = Predicate::and(vec![cmp(
            ComparisonOp::In,
            Operand::attribute("doc", "tags.[]"),
            Operand::value(vec!["x"]),
        )]);
        assert!(index.match_attributes(&predicate, "doc").by_field.is_empty());
    }

    #[test]
    fn multiple_conditions_group_per_field() {
        let index = index(&["a"]);
        let predicate = Predicate::and(vec![
            cmp(
                ComparisonOp::Ge,
                Operand::attribute("doc", "a"),
                Operand::value(2),
            ),
            cmp(
                ComparisonOp::Lt,
                Operand::attribute("doc", "a"),
                Operand::value(9),
            ),
        ]);

        let matches = index.match_attributes(&predicate, "doc");
        let matched = matches.field(0).unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].op(), ComparisonOp::Ge);
        assert_eq!(matched[1].op(), ComparisonOp::Lt);
    }
}
