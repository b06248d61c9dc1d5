use bson::{Document, doc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use basalt_index::{DocumentIterator, IndexDescriptor, IndexError, PersistentIndex, PrimaryIndex};
use basalt_query::{Comparison, ComparisonOp, Operand, Predicate};
use basalt_store::{MemoryStore, Store, Transaction};

// ── Helpers ─────────────────────────────────────────────────

/// Primary index that fabricates a handle per hit; key decoding cost is
/// not what these benchmarks measure.
struct NullPrimaryIndex;

impl PrimaryIndex for NullPrimaryIndex {
    fn lookup(&self, _primary_key: &[u8]) -> Result<Option<Document>, IndexError> {
        Ok(Some(doc! { "_id": "hit" }))
    }
}

fn generate_docs(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| {
            doc! {
                "_id": format!("rec-{i}"),
                "status": if i % 2 == 0 { "active" } else { "rejected" },
                "age": i as i32,
            }
        })
        .collect()
}

fn seeded(n: usize) -> (PersistentIndex, MemoryStore) {
    let index = PersistentIndex::new(IndexDescriptor::new(
        1,
        vec![basalt_query::AttributePath::parse("age")],
    ));
    let store = MemoryStore::new();
    let txn = store.begin(false).unwrap();
    for doc in generate_docs(n) {
        index.insert(&txn, &doc).unwrap();
    }
    txn.commit().unwrap();
    (index, store)
}

fn eq_predicate(age: i32) -> Predicate {
    Predicate::and(vec![Comparison::new(
        ComparisonOp::Eq,
        Operand::attribute("doc", "age"),
        Operand::value(age),
    )])
}

// ── Benchmarks ──────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for n in [100, 1_000, 10_000] {
        let docs = generate_docs(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &docs, |b, docs| {
            b.iter(|| {
                let index = PersistentIndex::new(IndexDescriptor::new(
                    1,
                    vec![basalt_query::AttributePath::parse("age")],
                ));
                let store = MemoryStore::new();
                let txn = store.begin(false).unwrap();
                for doc in docs {
                    index.insert(&txn, doc).unwrap();
                }
                txn.commit().unwrap();
            });
        });
    }
    group.finish();
}

fn bench_point_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_lookup");
    for n in [1_000, 10_000] {
        let (index, store) = seeded(n);
        let predicate = eq_predicate(42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &predicate, |b, predicate| {
            b.iter(|| {
                let txn = store.begin(true).unwrap();
                let mut iter = index
                    .iterator_for_condition(&txn, &NullPrimaryIndex, Some(predicate), "doc", false)
                    .unwrap();
                let mut hits = 0usize;
                while iter.next().unwrap().is_some() {
                    hits += 1;
                }
                hits
            });
        });
    }
    group.finish();
}

fn bench_range_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_scan");
    for n in [1_000, 10_000] {
        let (index, store) = seeded(n);
        let predicate = Predicate::and(vec![
            Comparison::new(
                ComparisonOp::Ge,
                Operand::attribute("doc", "age"),
                Operand::value(20),
            ),
            Comparison::new(
                ComparisonOp::Lt,
                Operand::attribute("doc", "age"),
                Operand::value(60),
            ),
        ]);
        group.bench_with_input(BenchmarkId::from_parameter(n), &predicate, |b, predicate| {
            b.iter(|| {
                let txn = store.begin(true).unwrap();
                let mut iter = index
                    .iterator_for_condition(&txn, &NullPrimaryIndex, Some(predicate), "doc", false)
                    .unwrap();
                let mut hits = 0usize;
                while iter.next().unwrap().is_some() {
                    hits += 1;
                }
                hits
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_point_lookup, bench_range_scan);
criterion_main!(benches);
