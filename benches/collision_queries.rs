//! Criterion benchmarks for map collision queries, with and without the
//! quadtree index.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

use rust_motion_planning::geometry::{BoundingBox, Circle};
use rust_motion_planning::mapping::GenerationConfig;
use rust_motion_planning::path_planning::segment_collides;
use rust_motion_planning::{Point2D, WorldMap};

fn generated_map(obs_count: usize, indexed: bool) -> WorldMap {
    let bounds = BoundingBox::new(-20.0, -20.0, 20.0, 20.0).unwrap();
    let mut map = if indexed {
        WorldMap::with_spatial_index(bounds, Point2D::origin(), 0.5)
    } else {
        WorldMap::new(bounds, Point2D::origin(), 0.5)
    };
    let config = GenerationConfig { obs_count, goal_max_dist: 15.0, max_attempts: 20 * obs_count, ..Default::default() };
    let mut rng = StdRng::seed_from_u64(17);
    map.generate(&config, Point2D::origin(), &[Circle::at(Point2D::origin(), 1.0)], &mut rng)
        .unwrap();
    map
}

fn probe_segments(n: usize) -> Vec<(Point2D, Point2D)> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            let a = Point2D::new(15.0 * t.cos(), 15.0 * t.sin());
            let b = Point2D::new(a.x + 0.5 * (3.0 * t).cos(), a.y + 0.5 * (3.0 * t).sin());
            (a, b)
        })
        .collect()
}

fn bench_segment_collides(c: &mut Criterion) {
    let probes = probe_segments(256);
    let mut group = c.benchmark_group("segment_collides");
    for &obs_count in &[10usize, 100, 400] {
        for indexed in [false, true] {
            let map = generated_map(obs_count, indexed);
            let label = if indexed { "quadtree" } else { "linear" };
            group.bench_with_input(BenchmarkId::new(label, obs_count), &map, |b, map| {
                b.iter(|| {
                    probes
                        .iter()
                        .filter(|(a, b)| segment_collides(map, a, b, 0.2))
                        .count()
                })
            });
        }
    }
    group.finish();
}

fn bench_step_motion(c: &mut Criterion) {
    c.bench_function("step_motion_quadtree_100", |b| {
        let mut map = generated_map(100, true);
        b.iter(|| map.step_motion(black_box(0.05)))
    });
}

criterion_group!(benches, bench_segment_collides, bench_step_motion);
criterion_main!(benches);
