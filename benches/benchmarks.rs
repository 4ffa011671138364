//! Performance benchmarks for ferro-wcs
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- transform

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferro_wcs::channel::Channel;
use ferro_wcs::frame::{Frame, FrameSet};
use ferro_wcs::mapping::{Mapping, PointSet, ProjKind};

// =============================================================================
// Transform benchmarks
// =============================================================================

fn batch(npoint: usize) -> PointSet {
    let lon: Vec<f64> = (0..npoint).map(|i| (i as f64) * 1e-4 - 0.5).collect();
    let lat: Vec<f64> = (0..npoint).map(|i| 0.3 + (i as f64) * 1e-4).collect();
    PointSet::from_axes(&[lon, lat]).unwrap()
}

/// Benchmark forward transforms per mapping kind
fn bench_transform(c: &mut Criterion) {
    let kinds = vec![
        ("zoom", Mapping::zoom(2, 2.0)),
        (
            "affine",
            Mapping::affine(2, 2, vec![2.0, 0.5, -0.5, 3.0], vec![1.0, -1.0]).unwrap(),
        ),
        ("gnomonic", Mapping::projection(ProjKind::Gnomonic)),
        (
            "series",
            Mapping::series(
                &Mapping::projection(ProjKind::Gnomonic),
                &Mapping::zoom(2, 57.29577951308232),
            )
            .unwrap(),
        ),
    ];
    let mut group = c.benchmark_group("transform");
    for npoint in [100usize, 10_000] {
        let points = batch(npoint);
        group.throughput(Throughput::Elements(npoint as u64));
        for (name, mapping) in &kinds {
            group.bench_with_input(
                BenchmarkId::new(*name, npoint),
                &points,
                |b, points| b.iter(|| mapping.transform(black_box(points), true).unwrap()),
            );
        }
    }
    group.finish();
}

// =============================================================================
// Simplification benchmarks
// =============================================================================

fn bench_simplify(c: &mut Criterion) {
    let scale = Mapping::affine(2, 2, vec![2.0, 0.0, 0.0, 3.0], vec![0.0, 0.0]).unwrap();
    let cancelling = Mapping::series(&scale, &scale.invert()).unwrap();

    let mut linear_run = Mapping::shift(vec![1.0, 1.0]);
    for _ in 0..8 {
        linear_run = Mapping::series(&linear_run, &Mapping::zoom(2, 1.5)).unwrap();
    }

    let mut group = c.benchmark_group("simplify");
    group.bench_function("cancelling_pair", |b| {
        b.iter(|| black_box(&cancelling).simplify())
    });
    group.bench_function("linear_run_of_9", |b| {
        b.iter(|| black_box(&linear_run).simplify())
    });
    group.finish();
}

// =============================================================================
// FrameSet benchmarks
// =============================================================================

fn bench_find_path(c: &mut Criterion) {
    let mut fs = FrameSet::new(Frame::new(2));
    for i in 1..=20 {
        fs.add_frame(i, Mapping::zoom(2, 1.1), Frame::new(2)).unwrap();
    }
    c.bench_function("find_path_20_hops", |b| {
        b.iter(|| black_box(&fs).find_path(1, 21).unwrap())
    });
}

// =============================================================================
// Channel benchmarks
// =============================================================================

fn bench_channel(c: &mut Criterion) {
    let mut fs = FrameSet::new(Frame::new(2));
    for i in 1..=5 {
        fs.add_frame(
            i,
            Mapping::series(&Mapping::zoom(2, 0.5), &Mapping::shift(vec![1.0, 2.0])).unwrap(),
            Frame::new(2),
        )
        .unwrap();
    }
    let obj = fs.into();

    let mut group = c.benchmark_group("channel");
    for (name, channel) in [
        ("native", Channel::native()),
        ("cards", Channel::cards()),
        ("markup", Channel::markup()),
    ] {
        let text = channel.encode(&obj).unwrap();
        group.bench_function(BenchmarkId::new("encode", name), |b| {
            b.iter(|| channel.encode(black_box(&obj)).unwrap())
        });
        group.bench_function(BenchmarkId::new("decode", name), |b| {
            let mut channel = channel.clone();
            b.iter(|| channel.decode(black_box(&text)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_transform,
    bench_simplify,
    bench_find_path,
    bench_channel
);
criterion_main!(benches);
