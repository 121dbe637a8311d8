use boxbook::models::ranking::{points, rank_users, ActivityCounts};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Build a synthetic month of activity for `n` members.
fn synthetic_counts(n: usize) -> Vec<ActivityCounts> {
    (0..n)
        .map(|i| ActivityCounts {
            user_id: format!("member-{}", i),
            display_name: format!("Member {}", i),
            check_ins: (i % 20) as u32,
            wods: (i % 12) as u32,
            streak: (i % 15) as u32,
        })
        .collect()
}

fn benchmark_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("monthly_ranking");

    group.bench_function("points_scoring", |b| {
        b.iter(|| points(black_box(12), black_box(8), black_box(11)))
    });

    for size in [100, 1_000, 10_000] {
        let counts = synthetic_counts(size);
        group.bench_function(format!("rank_users_{}", size), |b| {
            b.iter(|| rank_users(black_box(counts.clone())))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_ranking);
criterion_main!(benches);
