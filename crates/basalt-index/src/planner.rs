use basalt_query::{Predicate, SortCondition};

use crate::index::PersistentIndex;

/// Outcome of filter feasibility analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCosts {
    pub supported: bool,
    pub estimated_items: usize,
    pub estimated_cost: f64,
}

/// Outcome of sort feasibility analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortCosts {
    pub supported: bool,
    pub estimated_cost: f64,
    pub covered_attributes: usize,
}

impl PersistentIndex {
    /// Decide whether this index can serve `predicate`, and estimate the
    /// matched item count and scan cost relative to `items_in_index`.
    ///
    /// Fields are consumed left to right. Equality (including IN) keeps
    /// the chain alive and divides the cost by a decaying reduction
    /// factor; a range field divides once and ends the chain — any later
    /// field cannot narrow the scan further.
    pub fn supports_filter_condition(
        &self,
        predicate: &Predicate,
        reference: &str,
        items_in_index: usize,
    ) -> FilterCosts {
        let matches = self.match_attributes(predicate, reference);

        let mut last_contains_equality = true;
        let mut attributes_covered = 0usize;
        let mut attributes_covered_by_equality = 0usize;
        let mut equality_reduction_factor = 20.0;
        let mut estimated_cost = items_in_index as f64;
        let mut estimated_items = items_in_index;

        for i in 0..self.fields().len() {
            let Some(nodes) = matches.field(i) else {
                break;
            };
            if !last_contains_equality {
                break;
            }
            let contains_equality = nodes.iter().any(|m| m.is_equality());

            attributes_covered += 1;
            if contains_equality {
                attributes_covered_by_equality += 1;
                estimated_cost /= equality_reduction_factor;
                equality_reduction_factor = (equality_reduction_factor * 0.25).max(2.0);
            } else if nodes.len() >= 2 {
                // two conditions: most likely a two-sided range
                estimated_cost /= 7.5;
            } else {
                estimated_cost /= 2.0;
            }

            last_contains_equality = contains_equality;
        }

        let values = matches.values.max(1);

        if attributes_covered_by_equality == self.fields().len() && self.is_unique() {
            // every attribute pinned by equality on a unique index: at
            // most one hit per IN-expanded scan
            if estimated_items >= values {
                estimated_items = values;
                estimated_cost = estimated_items as f64;
            } else {
                estimated_cost *= 0.995;
            }
            return FilterCosts {
                supported: true,
                estimated_items,
                estimated_cost,
            };
        }

        if attributes_covered > 0
            && (!self.is_sparse() || attributes_covered == self.fields().len())
        {
            // a sparse index omits documents, so it only answers
            // predicates constraining every field
            let estimated_items = ((estimated_cost * values as f64) as usize).max(1);
            return FilterCosts {
                supported: true,
                estimated_items,
                estimated_cost: estimated_cost * values as f64,
            };
        }

        FilterCosts {
            supported: false,
            estimated_items: items_in_index,
            estimated_cost: items_in_index as f64,
        }
    }

    /// Decide whether index order satisfies `sort`, and at what cost.
    pub fn supports_sort_condition(
        &self,
        sort: &SortCondition,
        reference: &str,
        items_in_index: usize,
    ) -> SortCosts {
        if !self.is_sparse()
            && !self.uses_expansion()
            && sort.is_unidirectional()
            && sort.is_only_attribute_access()
        {
            let covered = self.covered_sort_attributes(sort, reference);
            if covered >= sort.num_attributes() {
                // index order is the sort order
                return SortCosts {
                    supported: true,
                    estimated_cost: 0.0,
                    covered_attributes: covered,
                };
            }
            if covered > 0 {
                let n = items_in_index as f64;
                return SortCosts {
                    supported: true,
                    estimated_cost: (n / covered as f64) * n.log2(),
                    covered_attributes: covered,
                };
            }
        }

        let estimated_cost = if items_in_index > 0 {
            let n = items_in_index as f64;
            n * n.log2()
        } else {
            0.0
        };
        SortCosts {
            supported: false,
            estimated_cost,
            covered_attributes: 0,
        }
    }

    /// Length of the longest sort prefix that coincides with the index
    /// fields.
    fn covered_sort_attributes(&self, sort: &SortCondition, reference: &str) -> usize {
        let mut covered = 0;
        for (field, entry) in self.fields().iter().zip(&sort.fields) {
            match entry.operand.attribute_for(reference) {
                Some(path) if path == field => covered += 1,
                _ => break,
            }
        }
        covered
    }
}
