use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use pullscope_core::{aggregate, AggregateQuery, Aggregation, Resolution, Sample};

fn gen_samples(n: usize) -> Vec<Sample> {
    let names = ["Warrior", "Mage", "Paladin"];
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.1;
            // simple waveform with drift
            let v = (i as f64 * 0.01).sin() * 1_000.0 + 2_000.0 + i as f64 * 0.01;
            Sample::new("enc-1", "damage", names[i % names.len()], t, v)
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let query = AggregateQuery::new("enc-1", "damage", Aggregation::Sum).with_total("All");
    for &n in &[50_000usize, 200_000usize] {
        let data = gen_samples(n);
        for &target in &[500usize, 2_000usize] {
            let res = Resolution::new(target).expect("non-zero");
            group.bench_with_input(BenchmarkId::from_parameter(format!("n{n}_p{target}")), &res, |b, &r| {
                b.iter_batched(
                    || data.clone(),
                    |d| {
                        black_box(aggregate(&d, &query, r));
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
