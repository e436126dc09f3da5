use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jelly_crush::core::{find_matches, Grid, LevelSession};
use jelly_crush::types::{Coord, LevelConfig};

const CHECKER: [&str; 8] = [
    "bkbkbkbk",
    "kbkbkbkb",
    "bkbkbkbk",
    "kbkbkbkb",
    "bkbkbkbk",
    "kbkbkbkb",
    "bkbkbkbk",
    "kbkbkbkb",
];

fn bench_find_matches(c: &mut Criterion) {
    let stable = Grid::from_rows(CHECKER);
    let mut rows = CHECKER;
    rows[3] = "kbwwwbkb";
    rows[6] = "bkbkccck";
    let busy = Grid::from_rows(rows);

    c.bench_function("find_matches_stable", |b| {
        b.iter(|| find_matches(black_box(&stable)))
    });
    c.bench_function("find_matches_two_runs", |b| {
        b.iter(|| find_matches(black_box(&busy)))
    });
}

fn bench_start_level(c: &mut Criterion) {
    let config = LevelConfig {
        seed: 12345,
        ..Default::default()
    };
    c.bench_function("start_level_5", |b| {
        b.iter(|| LevelSession::start_level(black_box(5), config).unwrap())
    });
}

fn bench_swap_cycle(c: &mut Criterion) {
    let mut rows = CHECKER;
    rows[2] = "bkwkbkbk";
    rows[3] = "kbwbkbkb";
    rows[4] = "bkbwbkbk";
    rows[5] = "kbwgkbkb";
    let seed_grid = Grid::from_rows(rows);

    c.bench_function("swap_resolve_cascade", |b| {
        b.iter(|| {
            let mut session =
                LevelSession::from_grid(seed_grid.clone(), 1, LevelConfig::default()).unwrap();
            session
                .attempt_swap(black_box(Coord::new(4, 3)), black_box(Coord::new(4, 2)))
                .unwrap();
            session.drain_events().len()
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut session = LevelSession::start_level(1, LevelConfig::default()).unwrap();
    c.bench_function("tick_50ms", |b| {
        b.iter(|| session.tick(black_box(50)))
    });
}

criterion_group!(
    benches,
    bench_find_matches,
    bench_start_level,
    bench_swap_cycle,
    bench_tick
);
criterion_main!(benches);
