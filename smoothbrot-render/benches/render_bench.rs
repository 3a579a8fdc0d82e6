use criterion::{criterion_group, criterion_main, Criterion};

use smoothbrot_core::{Grid, IterationParams, View};
use smoothbrot_render::{colorize, smooth, ColorRanges, CpuBackend, IterationBackend, Pipeline};

fn bench_full_pipeline(c: &mut Criterion) {
    let view = View::default().with_resolution(300).unwrap();
    let pipeline = Pipeline::new(CpuBackend::auto().unwrap());
    let ranges = ColorRanges::default();

    c.bench_function("pipeline_300x300", |b| {
        b.iter(|| pipeline.render(&view, &ranges).unwrap());
    });
}

fn bench_iteration_throughput(c: &mut Criterion) {
    let params = IterationParams::new(1000, 2.0).unwrap();
    let view = View::new((-0.8, -0.7), (0.05, 0.15), 256, params).unwrap();
    let grid = Grid::generate(&view);
    let backend = CpuBackend::auto().unwrap();

    c.bench_function("iterate_256x256_1000iter", |b| {
        b.iter(|| backend.iterate(grid.points(), view.params()).unwrap());
    });
}

fn bench_colorize(c: &mut Criterion) {
    let view = View::default().with_resolution(500).unwrap();
    let pipeline = Pipeline::new(CpuBackend::auto().unwrap());
    let result = pipeline.render(&view, &ColorRanges::default()).unwrap();
    let ranges = ColorRanges::default();

    c.bench_function("smooth_and_colorize_500x500", |b| {
        b.iter(|| {
            let dwell = smooth(&result.orbits);
            colorize(&dwell, &result.orbits, &ranges).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_full_pipeline,
    bench_iteration_throughput,
    bench_colorize
);
criterion_main!(benches);
