//! Benchmarks for classification, rendering and content decoding.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pdfweave::source::{decode_content, ContentInterpreter};
use pdfweave::{DrawingItem, GridClassifier, Point, Primitive, SvgRenderer};

/// A `rows` x `cols` ruled grid plus `extra` diagonal strokes.
fn synthetic_page(rows: usize, cols: usize, extra: usize) -> Vec<DrawingItem> {
    let (width, height) = (cols as f32 * 40.0, rows as f32 * 20.0);
    let mut items = Vec::new();

    for r in 0..=rows {
        let y = r as f32 * 20.0;
        items.push(DrawingItem::stroke(vec![Primitive::line(
            Point::new(0.0, y),
            Point::new(width, y),
        )]));
    }
    for c in 0..=cols {
        let x = c as f32 * 40.0;
        items.push(DrawingItem::stroke(vec![Primitive::line(
            Point::new(x, 0.0),
            Point::new(x, height),
        )]));
    }
    for i in 0..extra {
        let offset = i as f32 * 3.0;
        items.push(DrawingItem::stroke(vec![Primitive::line(
            Point::new(offset, offset),
            Point::new(offset + 17.0, offset + 29.0),
        )]));
    }
    items
}

fn synthetic_content(lines: usize) -> Vec<u8> {
    let mut content = String::new();
    for i in 0..lines {
        let y = 50.0 + i as f32 * 12.0;
        content.push_str(&format!("q 1 0 0 1 0 0 cm 50 {y} m 550 {y} l S Q\n"));
        content.push_str(&format!("BT /F1 10 Tf 60 {} Td (Row {i}) Tj ET\n", y + 2.0));
    }
    content.into_bytes()
}

/// Benchmark the grid classifier at various page sizes.
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let classifier = GridClassifier::new();

    for (rows, cols, extra) in [(4, 3, 0), (20, 8, 50), (60, 12, 200)] {
        let items = synthetic_page(rows, cols, extra);
        group.bench_function(format!("{}_items", items.len()), |b| {
            b.iter(|| classifier.classify(black_box(&items)));
        });
    }

    group.finish();
}

/// Benchmark SVG rendering of a classified wireframe.
fn bench_render(c: &mut Criterion) {
    let items = synthetic_page(40, 10, 0);
    let renderer = SvgRenderer::new();

    c.bench_function("render_wireframe", |b| {
        b.iter(|| renderer.render(black_box(&items), 612.0, 792.0));
    });
}

/// Benchmark content stream decoding and interpretation.
fn bench_interpret(c: &mut Criterion) {
    let data = synthetic_content(200);

    c.bench_function("decode_content", |b| {
        b.iter(|| decode_content(black_box(&data)).unwrap());
    });

    let ops = decode_content(&data).unwrap();
    c.bench_function("interpret_content", |b| {
        b.iter(|| ContentInterpreter::new().run(black_box(&ops)));
    });
}

criterion_group!(benches, bench_classify, bench_render, bench_interpret);
criterion_main!(benches);
