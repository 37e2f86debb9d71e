use criterion::{Criterion, black_box, criterion_group, criterion_main};

use redlilium_overlay::math::Vec3;
use redlilium_overlay::{
    Color, Line, LineId, MaterialHandle, OverlayComponent, OverlayDescriptor, Point,
    PrimitiveStore, Triangle,
};

fn populated_overlay(lines: usize, points: usize, triangles: usize) -> OverlayComponent {
    let mut overlay =
        OverlayComponent::new(OverlayDescriptor::new(MaterialHandle(1), MaterialHandle(2)));
    for i in 0..lines {
        let x = i as f32;
        overlay.add_line(Line::new(
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(x, 1.0, 1.0),
            Color::WHITE,
            1.0,
        ));
    }
    for i in 0..points {
        overlay.add_point(Point::new(Vec3::new(0.0, i as f32, 0.0), Color::RED, 2.0));
    }
    for i in 0..triangles {
        let z = i as f32;
        overlay.add_triangle(Triangle::flat(
            MaterialHandle(10 + (i % 4) as u64),
            [
                Vec3::new(0.0, 0.0, z),
                Vec3::new(1.0, 0.0, z),
                Vec3::new(0.0, 1.0, z),
            ],
            Color::WHITE,
        ));
    }
    overlay
}

// ---------------------------------------------------------------------------
// Batch building
// ---------------------------------------------------------------------------

fn bench_build_small(c: &mut Criterion) {
    let overlay = populated_overlay(64, 64, 64);
    c.bench_function("build_render_data_64", |b| {
        b.iter(|| black_box(overlay.build_render_data()));
    });
}

fn bench_build_large(c: &mut Criterion) {
    let overlay = populated_overlay(10_000, 10_000, 10_000);
    c.bench_function("build_render_data_10k", |b| {
        b.iter(|| black_box(overlay.build_render_data()));
    });
}

// ---------------------------------------------------------------------------
// Store mutation
// ---------------------------------------------------------------------------

fn bench_add_remove_lines(c: &mut Criterion) {
    let line = Line::new(Vec3::zeros(), Vec3::x(), Color::WHITE, 1.0);
    c.bench_function("store_add_remove_1k_lines", |b| {
        b.iter(|| {
            let mut store = PrimitiveStore::new();
            let ids: Vec<LineId> = (0..1000).map(|_| store.add_line(black_box(line))).collect();
            for id in ids {
                let _ = store.remove_line(id);
            }
            black_box(store.line_count())
        });
    });
}

fn bench_bounds(c: &mut Criterion) {
    let mut overlay = populated_overlay(10_000, 0, 0);
    c.bench_function("bounds_10k_lines", |b| {
        b.iter(|| black_box(redlilium_overlay::compute_bounds(overlay.store())));
    });
    c.bench_function("bounds_cached", |b| {
        b.iter(|| black_box(overlay.bounds()));
    });
}

criterion_group!(
    benches,
    bench_build_small,
    bench_build_large,
    bench_add_remove_lines,
    bench_bounds,
);
criterion_main!(benches);
