//! Per-frame cost of each scene at its default size.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sand_engine::{
    Bounds, Capsule, DriftConfig, DriftWorld, FrameInput, GridConfig, GridWorld, Obstacles, Pointer, SandConfig, SandWorld,
    Scene, TriangleConfig, TriangleField,
};

const W: f32 = 1280.0;
const H: f32 = 800.0;

fn obstacles() -> Obstacles {
    Obstacles {
        capsule: Some(Capsule::from_bounds(Bounds::new(440.0, 320.0, 400.0, 40.0))),
        glyphs: (0..12).map(|i| Bounds::new(460.0 + i as f32 * 30.0, 240.0, 24.0, 40.0)).collect(),
    }
}

fn input(obstacles: &Obstacles) -> FrameInput<'_> {
    FrameInput { pointer: Pointer::at(640.0, 500.0), width: W, height: H, obstacles }
}

/// Sand after `warmup` frames, so the bench sees a settled pile.
fn settled_sand(count: usize, obstacles: &Obstacles, warmup: usize) -> SandWorld {
    let mut sand = SandWorld::new(SandConfig { count, ..SandConfig::default() });
    sand.reset(W, H, obstacles);
    sand.activate(obstacles);
    for _ in 0..warmup {
        sand.step(&input(obstacles));
    }
    sand
}

fn bench_sand(c: &mut Criterion) {
    let obs = obstacles();
    let mut group = c.benchmark_group("sand_step");

    for count in [100usize, 300, 600] {
        group.bench_with_input(BenchmarkId::new("falling", count), &count, |b, &count| {
            let mut sand = settled_sand(count, &obs, 0);
            b.iter(|| sand.step(black_box(&input(&obs))))
        });
    }

    group.bench_function("settled_300", |b| {
        let mut sand = settled_sand(300, &obs, 500);
        b.iter(|| sand.step(black_box(&input(&obs))))
    });

    group.finish();
}

fn bench_backgrounds(c: &mut Criterion) {
    let obs = Obstacles::none();
    let mut group = c.benchmark_group("background_step");

    group.bench_function("drift", |b| {
        let mut scene = DriftWorld::new(DriftConfig::default());
        scene.reset(W, H, &obs);
        b.iter(|| scene.step(black_box(&input(&obs))))
    });

    group.bench_function("grid", |b| {
        let mut scene = GridWorld::new(GridConfig::default());
        scene.reset(W, H, &obs);
        b.iter(|| scene.step(black_box(&input(&obs))))
    });

    group.bench_function("triangles", |b| {
        let mut scene = TriangleField::new(TriangleConfig::default());
        scene.reset(W, H, &obs);
        b.iter(|| scene.step(black_box(&input(&obs))))
    });

    group.finish();
}

criterion_group!(benches, bench_sand, bench_backgrounds);
criterion_main!(benches);
