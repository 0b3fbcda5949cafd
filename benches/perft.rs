use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kaskelot::game::movegen::perft;
use kaskelot::game::Position;

fn perft_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft_starting_position");
    group.significance_level(0.1).sample_size(50);

    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut pos = Position::initial();
                black_box(perft(&mut pos, depth))
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("perft_kiwipete");
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut pos = Position::from_fen(
                    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
                )
                .unwrap();
                black_box(perft(&mut pos, depth))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, perft_benchmark);
criterion_main!(benches);
