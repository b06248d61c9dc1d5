//! Extraction of index tuples from documents.

use bson::{Bson, Document};

use basalt_query::{AttributePath, PathSegment};

/// Every value reachable along `path`.
///
/// A non-expanded path yields exactly one value, `Bson::Undefined` when
/// any step is missing or traverses a non-document. An expanded step
/// walks each element of the array at that position; anything other than
/// an array there yields no values at all.
fn field_values(doc: &Document, path: &AttributePath) -> Vec<Bson> {
    let mut out = Vec::new();
    collect(doc, &path.segments, &mut out);
    if out.is_empty() && !path.has_expansion() {
        out.push(Bson::Undefined);
    }
    out
}

fn collect(doc: &Document, segments: &[PathSegment], out: &mut Vec<Bson>) {
    let Some((segment, rest)) = segments.split_first() else {
        return;
    };
    let Some(value) = doc.get(&segment.name) else {
        return;
    };
    if segment.expanded {
        let Bson::Array(items) = value else {
            return;
        };
        for item in items {
            continue_path(item, rest, out);
        }
    } else {
        continue_path(value, rest, out);
    }
}

fn continue_path(value: &Bson, segments: &[PathSegment], out: &mut Vec<Bson>) {
    if segments.is_empty() {
        out.push(value.clone());
        return;
    }
    let Bson::Document(doc) = value else {
        return;
    };
    collect(doc, segments, out);
}

/// Build the tuples `doc` contributes to an index over `fields`.
///
/// Sparse indexes contribute nothing when any field resolves to
/// undefined. Expanded fields multiply: the result is the cross product
/// of the per-field value lists, so an expanded field with no reachable
/// elements contributes nothing either.
pub(crate) fn build_tuples(
    doc: &Document,
    fields: &[AttributePath],
    sparse: bool,
) -> Vec<Vec<Bson>> {
    let mut per_field: Vec<Vec<Bson>> = Vec::with_capacity(fields.len());
    for path in fields {
        let values = field_values(doc, path);
        if sparse && values.contains(&Bson::Undefined) {
            return Vec::new();
        }
        if values.is_empty() {
            return Vec::new();
        }
        per_field.push(values);
    }
    cross_product(&per_field)
}

fn cross_product(per_field: &[Vec<Bson>]) -> Vec<Vec<Bson>> {
    let mut tuples: Vec<Vec<Bson>> = vec![Vec::new()];
    for values in per_field {
        let mut next = Vec::with_capacity(tuples.len() * values.len());
        for tuple in &tuples {
            for value in values {
                let mut extended = tuple.clone();
                extended.push(value.clone());
                next.push(extended);
            }
        }
        tuples = next;
    }
    tuples
}
