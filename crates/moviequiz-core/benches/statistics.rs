use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::Utc;
use moviequiz_core::model::GameResult;
use moviequiz_core::statistics::{best_game, compute_statistics, total_accuracy};
use uuid::Uuid;

fn make_history(n: usize) -> Vec<GameResult> {
    (0..n)
        .map(|i| GameResult {
            id: Uuid::nil(),
            correct: (i * 7 % 11) as u32,
            total: 10,
            date: Utc::now(),
        })
        .collect()
}

fn bench_statistics(c: &mut Criterion) {
    let small = make_history(100);
    let large = make_history(100_000);

    c.bench_function("compute_statistics_100", |b| {
        b.iter(|| compute_statistics(black_box(&small)))
    });

    c.bench_function("compute_statistics_100k", |b| {
        b.iter(|| compute_statistics(black_box(&large)))
    });

    c.bench_function("best_game_100k", |b| b.iter(|| best_game(black_box(&large))));

    c.bench_function("total_accuracy_100k", |b| {
        b.iter(|| total_accuracy(black_box(&large)))
    });
}

criterion_group!(benches, bench_statistics);
criterion_main!(benches);
