use bson::Bson;

use basalt_query::{ComparisonOp, Predicate};
use basalt_store::Transaction;

use crate::codec;
use crate::error::IndexError;
use crate::failpoint;
use crate::index::PersistentIndex;
use crate::iterator::{DocumentIterator, IndexIterator, MultiIndexIterator, PrimaryIndex};
use crate::matcher::AccessSide;

/// Per-field lookup instruction, in index-field order.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    /// Exact match on this field.
    Eq(Bson),
    /// Alternative exact matches; expanded into one scan per value
    /// before a lookup runs.
    In(Vec<Bson>),
    /// One- or two-sided range on this field. Each bound carries its
    /// inclusive flag. Only the last search value may be a range.
    Range {
        lower: Option<(Bson, bool)>,
        upper: Option<(Bson, bool)>,
    },
}

/// Map an operator matched as `value OP doc.attr` to the equivalent
/// with the attribute on the left.
fn flip(op: ComparisonOp) -> ComparisonOp {
    match op {
        ComparisonOp::Lt => ComparisonOp::Gt,
        ComparisonOp::Le => ComparisonOp::Ge,
        ComparisonOp::Gt => ComparisonOp::Lt,
        ComparisonOp::Ge => ComparisonOp::Le,
        other => other,
    }
}

/// Expand every `In` slot into per-value `Eq` copies: the cross product
/// over all `In` slots, one search-value array per scan.
///
/// Values are ordered by their encoded form and deduplicated, so the
/// concatenation of the per-copy scans preserves global entry order.
/// Values the codec cannot represent are skipped; they cannot be present
/// in the index either.
fn expand_in_search_values(search: &[SearchValue]) -> Vec<Vec<SearchValue>> {
    let mut expanded: Vec<Vec<SearchValue>> = vec![Vec::new()];
    for value in search {
        match value {
            SearchValue::In(items) => {
                let mut ordered: Vec<(Vec<u8>, &Bson)> = items
                    .iter()
                    .filter_map(|item| codec::value_bytes(item).ok().map(|key| (key, item)))
                    .collect();
                ordered.sort_by(|a, b| a.0.cmp(&b.0));
                ordered.dedup_by(|a, b| a.0 == b.0);

                let mut next = Vec::with_capacity(expanded.len() * ordered.len());
                for prefix in &expanded {
                    for (_, item) in &ordered {
                        let mut copy = prefix.clone();
                        copy.push(SearchValue::Eq((*item).clone()));
                        next.push(copy);
                    }
                }
                expanded = next;
            }
            other => {
                for prefix in &mut expanded {
                    prefix.push(other.clone());
                }
            }
        }
    }
    expanded
}

impl PersistentIndex {
    /// Open a bounded scan for `search` values.
    ///
    /// The leading `Eq` values form the equality prefix of both
    /// endpoints; a final `Range` extends one or both endpoints by its
    /// bound. `In` values must have been expanded away by the caller.
    pub fn lookup<'a, T: Transaction, P: PrimaryIndex>(
        &self,
        txn: &'a T,
        primary: &'a P,
        search: &[SearchValue],
        reverse: bool,
    ) -> Result<IndexIterator<'a, T::Cursor<'a>, P>, IndexError> {
        debug_assert!(search.len() <= self.fields().len());

        let mut left: Vec<Bson> = Vec::with_capacity(search.len());
        let mut range = None;
        for value in search {
            match value {
                SearchValue::Eq(v) => left.push(v.clone()),
                SearchValue::Range { lower, upper } => {
                    range = Some((lower, upper));
                    break;
                }
                SearchValue::In(_) => {
                    debug_assert!(false, "IN search value reached lookup unexpanded");
                    return Err(IndexError::Internal("unexpanded IN search value".into()));
                }
            }
        }

        let mut right = left.clone();
        let mut left_inclusive = true;
        let mut right_inclusive = true;
        if let Some((lower, upper)) = range {
            if let Some((value, inclusive)) = lower {
                left.push(value.clone());
                left_inclusive = *inclusive;
            }
            if let Some((value, inclusive)) = upper {
                right.push(value.clone());
                right_inclusive = *inclusive;
            }
        }

        let left_key = codec::entry_key(self.id(), &left)?;
        let right_key = codec::entry_key(self.id(), &right)?;

        let cursor = txn.cursor()?;
        Ok(IndexIterator::new(
            cursor,
            primary,
            left_key,
            left_inclusive,
            right_key,
            right_inclusive,
            reverse,
        ))
    }

    /// Materialize the iterator for a specialized predicate, or for a
    /// sort-only scan over the whole index when `predicate` is `None`.
    ///
    /// Callers must have gated the predicate through
    /// [`supports_filter_condition`](Self::supports_filter_condition)
    /// and canonicalized it through
    /// [`specialize_condition`](Self::specialize_condition) first.
    pub fn iterator_for_condition<'a, T: Transaction, P: PrimaryIndex>(
        &self,
        txn: &'a T,
        primary: &'a P,
        predicate: Option<&Predicate>,
        reference: &str,
        reverse: bool,
    ) -> Result<Box<dyn DocumentIterator + 'a>, IndexError>
    where
        T::Cursor<'a>: 'a,
        P: 'a,
    {
        let mut search: Vec<SearchValue> = Vec::new();
        let mut need_normalize = false;

        match predicate {
            None => {
                failpoint::check("persistent-index::sort-iterator")?;
            }
            Some(predicate) => {
                let matches = self.match_attributes(predicate, reference);

                // Leading fields carry one equality each (== or IN).
                let mut used_fields = 0;
                while used_fields < self.fields().len() {
                    let Some(nodes) = matches.field(used_fields) else {
                        break;
                    };
                    let node = &nodes[0];
                    let Some(value) = node.constant() else {
                        return Err(IndexError::Internal(
                            "matched comparison without a constant operand".into(),
                        ));
                    };
                    match node.op() {
                        ComparisonOp::Eq => {
                            failpoint::check("persistent-index::eq-search-value")?;
                            search.push(SearchValue::Eq(value.clone()));
                        }
                        ComparisonOp::In => {
                            if self.field_is_expanded(used_fields) {
                                // `x IN doc.v.[]`: the scalar is an
                                // exact match within the flattened array
                                failpoint::check("persistent-index::expanded-in-search-value")?;
                                search.push(SearchValue::Eq(value.clone()));
                            } else {
                                need_normalize = true;
                                let items = match value {
                                    Bson::Array(items) => items.clone(),
                                    single => vec![single.clone()],
                                };
                                search.push(SearchValue::In(items));
                            }
                        }
                        _ => break,
                    }
                    used_fields += 1;
                }

                // The next field, if matched, contributes the one range.
                if used_fields < self.fields().len() {
                    if let Some(nodes) = matches.field(used_fields) {
                        debug_assert!(nodes.len() <= 2, "specialized range field holds at most two bounds");
                        let mut lower = None;
                        let mut upper = None;
                        for node in nodes {
                            let Some(value) = node.constant() else {
                                return Err(IndexError::Internal(
                                    "matched comparison without a constant operand".into(),
                                ));
                            };
                            let op = match node.side {
                                AccessSide::Left => node.op(),
                                AccessSide::Right => flip(node.op()),
                            };
                            match op {
                                ComparisonOp::Gt => lower = Some((value.clone(), false)),
                                ComparisonOp::Ge => lower = Some((value.clone(), true)),
                                ComparisonOp::Lt => upper = Some((value.clone(), false)),
                                ComparisonOp::Le => upper = Some((value.clone(), true)),
                                ComparisonOp::Eq | ComparisonOp::In => {
                                    debug_assert!(false, "equality on a range field");
                                    return Err(IndexError::Internal(
                                        "unexpected equality on a range field".into(),
                                    ));
                                }
                            }
                        }
                        if lower.is_some() || upper.is_some() {
                            search.push(SearchValue::Range { lower, upper });
                        }
                    }
                }
            }
        }

        failpoint::check("persistent-index::iterator")?;

        if need_normalize {
            let expanded = expand_in_search_values(&search);
            let mut iterators: Vec<Box<dyn DocumentIterator + 'a>> =
                Vec::with_capacity(expanded.len());
            for values in &expanded {
                iterators.push(Box::new(self.lookup(txn, primary, values, reverse)?));
            }
            if reverse {
                iterators.reverse();
            }
            return Ok(Box::new(MultiIndexIterator::new(iterators)));
        }

        Ok(Box::new(self.lookup(txn, primary, &search, reverse)?))
    }
}
