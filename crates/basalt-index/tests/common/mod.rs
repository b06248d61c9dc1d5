#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use bson::{Bson, Document};

use basalt_index::{codec, DocumentIterator, IndexError, PersistentIndex, PrimaryIndex};
use basalt_query::{AttributePath, Comparison, ComparisonOp, Operand, Predicate};
use basalt_store::Transaction;

/// Primary-key → document map standing in for the primary index.
#[derive(Default)]
pub struct DocumentStore {
    docs: RefCell<HashMap<Vec<u8>, Document>>,
}

impl DocumentStore {
    pub fn insert(&self, doc: &Document) {
        let id = doc.get("_id").expect("test document needs _id");
        let key = codec::value_bytes(id).unwrap();
        self.docs.borrow_mut().insert(key, doc.clone());
    }

    pub fn remove(&self, doc: &Document) {
        let id = doc.get("_id").expect("test document needs _id");
        let key = codec::value_bytes(id).unwrap();
        self.docs.borrow_mut().remove(&key);
    }
}

impl PrimaryIndex for DocumentStore {
    fn lookup(&self, primary_key: &[u8]) -> Result<Option<Document>, IndexError> {
        Ok(self.docs.borrow().get(primary_key).cloned())
    }
}

/// Insert `doc` into both the document store and the index.
pub fn store_doc<T: Transaction>(
    index: &PersistentIndex,
    txn: &T,
    docs: &DocumentStore,
    doc: Document,
) {
    docs.insert(&doc);
    index.insert(txn, &doc).unwrap();
}

/// The string `_id` of a document.
pub fn doc_id(doc: &Document) -> String {
    match doc.get("_id") {
        Some(Bson::String(id)) => id.clone(),
        other => panic!("expected string _id, got {other:?}"),
    }
}

/// Collect the `_id` of every document an iterator yields.
pub fn drain(mut iter: Box<dyn DocumentIterator + '_>) -> Vec<String> {
    let mut ids = Vec::new();
    while let Some(doc) = iter.next().unwrap() {
        ids.push(doc_id(&doc));
    }
    ids
}

pub fn attr(path: &str) -> Operand {
    Operand::attribute("doc", path)
}

pub fn val(value: impl Into<Bson>) -> Operand {
    Operand::value(value)
}

pub fn cmp(op: ComparisonOp, lhs: Operand, rhs: Operand) -> Comparison {
    Comparison::new(op, lhs, rhs)
}

pub fn pred(comparisons: Vec<Comparison>) -> Predicate {
    Predicate::and(comparisons)
}

pub fn fields(specs: &[&str]) -> Vec<AttributePath> {
    specs.iter().map(|s| AttributePath::parse(s)).collect()
}
