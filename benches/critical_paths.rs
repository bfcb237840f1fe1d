//! Criterion benchmarks for nineslice critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Layout: region decomposition for a target size
//! - Editor: hit-testing and clamped line moves
//! - Compositor: cell resampling, sequential vs. rayon
//! - Output: PNG encoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use nineslice::compositor::{composite_with, CompositeOptions, ResampleFilter};
use nineslice::editor::{locate_pointer_target, SliceEditor};
use nineslice::layout::decompose;
use nineslice::models::{CutLines, LineId, TargetSize};
use nineslice::output::encode_png;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Bordered panel: opaque frame, translucent gradient center
fn make_panel(size: u32) -> RgbaImage {
    let border = size / 4;
    RgbaImage::from_fn(size, size, |x, y| {
        let inside = x >= border && x < size - border && y >= border && y < size - border;
        if inside {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 160])
        } else {
            Rgba([40, 40, 60, 255])
        }
    })
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let lines = CutLines::thirds(96, 96);

    group.bench_function("decompose", |b| {
        b.iter(|| decompose(black_box(96), black_box(96), &lines, TargetSize::new(640, 480)))
    });
    group.bench_function("decompose_degenerate", |b| {
        b.iter(|| decompose(black_box(96), black_box(96), &lines, TargetSize::new(20, 20)))
    });

    group.finish();
}

fn bench_editor(c: &mut Criterion) {
    let mut group = c.benchmark_group("editor");
    let lines = CutLines::thirds(300, 300);

    group.bench_function("locate_hit", |b| {
        b.iter(|| locate_pointer_target(&lines, black_box(102.0), black_box(150.0), 15.0))
    });
    group.bench_function("locate_miss", |b| {
        b.iter(|| locate_pointer_target(&lines, black_box(150.0), black_box(150.0), 15.0))
    });
    group.bench_function("drag_sweep", |b| {
        b.iter(|| {
            let mut editor = SliceEditor::new(300, 300);
            for x in (-50..350).step_by(5) {
                editor.move_line(LineId::Vertical1, black_box(x));
            }
            editor.lines()
        })
    });

    group.finish();
}

fn bench_compositor(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositor");
    group.sample_size(20);

    let source = make_panel(128);
    let lines = CutLines::thirds(128, 128);

    for size in [256u32, 1024].iter() {
        let target = TargetSize::new(*size, *size);
        group.throughput(Throughput::Elements((*size as u64) * (*size as u64)));

        for parallel in [false, true] {
            let options = CompositeOptions { filter: ResampleFilter::Triangle, parallel };
            let name = if parallel { "triangle_parallel" } else { "triangle_sequential" };
            group.bench_with_input(BenchmarkId::new(name, size), &target, |b, target| {
                b.iter(|| composite_with(black_box(&source), &lines, *target, &options))
            });
        }

        let nearest = CompositeOptions { filter: ResampleFilter::Nearest, parallel: true };
        group.bench_with_input(BenchmarkId::new("nearest", size), &target, |b, target| {
            b.iter(|| composite_with(black_box(&source), &lines, *target, &nearest))
        });
    }

    group.finish();
}

fn bench_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("output");
    group.sample_size(20);

    let (image, _warnings) = composite_with(
        &make_panel(128),
        &CutLines::thirds(128, 128),
        TargetSize::new(512, 512),
        &CompositeOptions::default(),
    );
    group.bench_function("encode_png_512", |b| b.iter(|| encode_png(black_box(&image))));

    group.finish();
}

criterion_group!(benches, bench_layout, bench_editor, bench_compositor, bench_output);
criterion_main!(benches);
