//! Benchmarks for the camera sort

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Mat4, Vec3};
use tessera_core::BatchingConfig;
use tessera_sort::CameraSortRunner;
use tessera_test_utils::{SortFixture, front_camera, orthographic_camera};

/// `count` single-quad roots stacked in depth and fanned out so neighbours overlap.
fn stacked_roots(count: u32) -> SortFixture {
    let mut fixture = SortFixture::new();
    for i in 0..count {
        let world = Mat4::from_translation(Vec3::new(
            (i % 10) as f32 * 2.0 - 10.0,
            (i / 10 % 10) as f32 * 2.0 - 10.0,
            -(i as f32) * 0.5,
        ));
        fixture.add_quad(world, -4.0, -4.0, 8.0, 8.0);
    }
    fixture
}

fn bench_sort_perspective(c: &mut Criterion) {
    let mut group = c.benchmark_group("camera_sort_perspective");

    for count in [10, 50, 200] {
        let fixture = stacked_roots(count);
        let camera = front_camera(0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &fixture, |b, fixture| {
            let mut runner = CameraSortRunner::new(BatchingConfig::default());
            let roots = fixture.roots();
            b.iter(|| black_box(runner.sort(&camera, &roots)));
        });
    }

    group.finish();
}

fn bench_sort_orthographic(c: &mut Criterion) {
    let fixture = stacked_roots(200);
    let camera = orthographic_camera(0, Vec3::new(0.0, 0.0, 100.0));
    let mut runner = CameraSortRunner::new(BatchingConfig::default());
    let roots = fixture.roots();

    c.bench_function("camera_sort_orthographic_200", |b| {
        b.iter(|| black_box(runner.sort(&camera, &roots)));
    });
}

criterion_group!(benches, bench_sort_perspective, bench_sort_orthographic);
criterion_main!(benches);
