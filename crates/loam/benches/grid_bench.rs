use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loam::{Rect, SpatialGrid};

fn populated_grid(count: u32, spacing: f32) -> SpatialGrid<u32> {
    let mut grid = SpatialGrid::new();
    // Lay members out on a diagonal band so queries hit a realistic mix of
    // occupied and empty cells
    for i in 0..count {
        let offset = i as f32 * spacing;
        grid.insert(i, Rect::new(offset, offset * 0.5, 48.0, 48.0));
    }
    grid
}

fn bench_query_small_window(c: &mut Criterion) {
    let grid = populated_grid(2_000, 20.0);

    c.bench_function("query_small_window", |b| {
        b.iter(|| grid.query(black_box(Rect::new(5_000.0, 2_500.0, 64.0, 64.0))))
    });
}

fn bench_query_wide_window(c: &mut Criterion) {
    let grid = populated_grid(2_000, 20.0);

    c.bench_function("query_wide_window", |b| {
        b.iter(|| grid.query(black_box(Rect::new(0.0, 0.0, 2_048.0, 2_048.0))))
    });
}

fn bench_insert_remove_cycle(c: &mut Criterion) {
    c.bench_function("insert_remove_cycle", |b| {
        let mut grid = populated_grid(500, 32.0);
        b.iter(|| {
            grid.insert(u32::MAX, black_box(Rect::new(100.0, 100.0, 48.0, 48.0)));
            grid.remove(&u32::MAX);
        })
    });
}

criterion_group!(
    benches,
    bench_query_small_window,
    bench_query_wide_window,
    bench_insert_remove_cycle
);
criterion_main!(benches);
