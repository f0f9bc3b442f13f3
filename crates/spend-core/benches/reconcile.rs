use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spend_core::{eligible, reconcile};
use spend_domain::{CatalogEntry, CategoryAssignment};

/// Children listed before their parents, the worst case for placeholders.
fn build_assignments(parents: i64, children_per_parent: i64) -> Vec<CategoryAssignment> {
    let mut records = Vec::new();
    for parent in 1..=parents {
        for offset in 1..=children_per_parent {
            let id = parents + parent * children_per_parent + offset;
            records.push(CategoryAssignment::child(id, parent, format!("child {id}"), ""));
        }
    }
    for parent in 1..=parents {
        records.push(CategoryAssignment::parent(parent, format!("parent {parent}"), "notes"));
    }
    records
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for parents in [10_i64, 100, 1_000] {
        let records = build_assignments(parents, 5);
        group.bench_with_input(BenchmarkId::from_parameter(parents), &records, |b, records| {
            b.iter(|| reconcile(black_box(records)))
        });
    }
    group.finish();
}

fn bench_eligible(c: &mut Criterion) {
    let records = build_assignments(500, 4);
    let catalog: Vec<CatalogEntry> = (1..=5_000)
        .map(|id| CatalogEntry::new(id, format!("category {id}")))
        .collect();
    c.bench_function("eligible_5000", |b| {
        b.iter(|| eligible(black_box(&catalog), black_box(&records)))
    });
}

criterion_group!(benches, bench_reconcile, bench_eligible);
criterion_main!(benches);
