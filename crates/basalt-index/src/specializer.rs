use std::collections::HashSet;

use basalt_query::{ComparisonOp, Predicate};

use crate::index::PersistentIndex;
use crate::matcher::MatchedComparison;

/// Precedence for canonicalizing per-field operator lists: equality
/// first, then lower bounds before upper bounds of the same strictness.
fn sort_weight(op: ComparisonOp) -> u8 {
    match op {
        ComparisonOp::Eq => 1,
        ComparisonOp::In => 2,
        ComparisonOp::Lt => 3,
        ComparisonOp::Gt => 4,
        ComparisonOp::Le => 5,
        ComparisonOp::Ge => 6,
    }
}

/// Whether `op` adds nothing over the operators already accepted for
/// this field: exact repeats, anything after an equality, and the
/// weaker/stronger twin of an accepted bound.
fn is_duplicate_operator(op: ComparisonOp, accepted: &HashSet<ComparisonOp>) -> bool {
    if accepted.contains(&op) {
        return true;
    }
    if accepted.contains(&ComparisonOp::Eq) || accepted.contains(&ComparisonOp::In) {
        return true;
    }
    let related = match op {
        ComparisonOp::Lt => ComparisonOp::Le,
        ComparisonOp::Le => ComparisonOp::Lt,
        ComparisonOp::Gt => ComparisonOp::Ge,
        ComparisonOp::Ge => ComparisonOp::Gt,
        ComparisonOp::Eq => ComparisonOp::In,
        ComparisonOp::In => ComparisonOp::Eq,
    };
    accepted.contains(&related)
}

impl PersistentIndex {
    /// Rewrite `predicate` to the canonical form this index consumes:
    /// only comparisons attributed to a usable field prefix survive,
    /// each field's operators sorted by precedence with duplicates and
    /// subsumed operators dropped. Pure rewrite of the conjunction;
    /// idempotent.
    pub fn specialize_condition(&self, predicate: &Predicate, reference: &str) -> Predicate {
        let matches = self.match_attributes(predicate, reference);

        let mut children = Vec::new();
        let mut last_contains_equality = true;

        for i in 0..self.fields().len() {
            let Some(nodes) = matches.field(i) else {
                break;
            };
            if !last_contains_equality {
                // a range field has been consumed; one range per scan
                break;
            }
            let contains_equality = nodes.iter().any(MatchedComparison::is_equality);

            let mut nodes: Vec<&MatchedComparison> = nodes.iter().collect();
            nodes.sort_by_key(|m| sort_weight(m.op()));

            last_contains_equality = contains_equality;
            let mut accepted = HashSet::new();
            for node in nodes {
                if is_duplicate_operator(node.op(), &accepted) {
                    continue;
                }
                accepted.insert(node.op());
                children.push(node.comparison.clone());
            }
        }

        Predicate::and(children)
    }
}
