use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use relata_core::{Relation, RelationConfig};
use relata_types::{Field, bound, unbound};
use std::time::Duration;

type Employees = (Field<u64>, Field<String>, Field<u32>);

fn populated(size: u64) -> Relation<Employees> {
    let config = RelationConfig::default().with_initial_capacity(size as usize);
    let relation = Relation::with_config(Employees::default(), config).unwrap();
    for i in 0..size {
        relation.add((i, format!("dept_{}", i % 10), (i % 100) as u32));
    }
    relation
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("relation_add");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for size in [1_000u64, 10_000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::new("add", size), size, |b, &size| {
            b.iter(|| black_box(populated(size)));
        });
    }
    group.finish();
}

fn bench_pattern_reads(c: &mut Criterion) {
    let relation = populated(100_000);

    c.bench_function("read_exact", |b| {
        let row = (4_242u64, "dept_2".to_string(), 42u32);
        b.iter(|| black_box(relation.query(&row)));
    });

    c.bench_function("read_by_department", |b| {
        let pattern = (unbound(), bound("dept_3"), unbound());
        b.iter(|| black_box(relation.read_matching(&pattern).unwrap().count()));
    });

    c.bench_function("read_department_and_score", |b| {
        let pattern = (unbound(), bound("dept_3"), bound(13u32));
        b.iter(|| black_box(relation.read_matching(&pattern).unwrap().count()));
    });
}

fn bench_remove_and_re_add(c: &mut Criterion) {
    let relation = populated(10_000);

    c.bench_function("remove_matching_then_re_add", |b| {
        let pattern = (bound(77u64), unbound(), unbound());
        b.iter(|| {
            let removed = relation.remove_matching(&pattern).unwrap();
            for row in removed {
                relation.add(row);
            }
        });
    });
}

criterion_group!(benches, bench_add, bench_pattern_reads, bench_remove_and_re_add);
criterion_main!(benches);
