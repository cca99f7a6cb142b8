//! Scene animation and draw-list benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Mat4;
use orrery::animation::{FrameClock, SpinAnimator};
use orrery::options::AnimationOptions;
use orrery::scene::catalog::Catalog;
use orrery::scene::system::{BodyId, SolarSystem};
use orrery::scene::ModelSlot;

fn loaded_system() -> SolarSystem {
    let mut system = SolarSystem::new(&Catalog::solar_system());
    for i in 0..system.bodies().len() {
        let _ = system.attach_model(BodyId(i), ModelSlot(i));
    }
    system
}

fn advance_benchmark(c: &mut Criterion) {
    let mut system = loaded_system();
    let animator = SpinAnimator::new(false);
    c.bench_function("advance_one_frame", |b| {
        b.iter(|| animator.advance(black_box(&mut system), black_box(1.0)));
    });
}

fn draw_list_benchmark(c: &mut Criterion) {
    let system = loaded_system();
    c.bench_function("draw_list", |b| {
        b.iter(|| black_box(system.draw_list()));
    });
    c.bench_function("world_matrices", |b| {
        b.iter(|| black_box(system.graph().world_matrices()));
    });
}

fn frame_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    for dt in [1.0 / 144.0, 1.0 / 60.0, 1.0 / 20.0] {
        let mut system = loaded_system();
        let animator = SpinAnimator::new(false);
        let mut clock = FrameClock::new(&AnimationOptions::default());
        group.bench_function(format!("dt_{:.4}", dt), |b| {
            b.iter(|| {
                let frames = clock.tick(black_box(dt));
                animator.advance(&mut system, frames);
                let items = system.draw_list();
                black_box(items.iter().fold(Mat4::ZERO, |acc, i| acc + i.world))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    advance_benchmark,
    draw_list_benchmark,
    frame_benchmark
);
criterion_main!(benches);
