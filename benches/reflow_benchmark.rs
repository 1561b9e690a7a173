//! Benchmarks for reflow pagination performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks drive the full pipeline over synthetic page content.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use repage::source::{BitmapRef, FontRef, SourceImage, SourceSpan, StaticPage};
use repage::{reflow, extract_runs, Rect, ReflowMode};

/// Create a synthetic page with the given number of text spans and an
/// image every 50 spans.
fn create_test_page(span_count: usize) -> StaticPage {
    let mut page = StaticPage::new();
    let mut y = 100_000.0;
    for i in 0..span_count {
        page = page.with_span(SourceSpan::new(
            format!("word{:04} of the benchmark corpus", i),
            (i % 3) as f32 * 170.0,
            y,
            160.0,
            11.0,
            FontRef::new("Helvetica"),
        ));
        if i % 3 == 2 {
            y -= 14.0;
        }
        if i % 50 == 49 {
            y -= 120.0;
            page = page.with_image(SourceImage::new(
                BitmapRef::new(format!("img{i}"), 640, 480),
                Rect::new(0.0, y, 320.0, 110.0),
            ));
            y -= 14.0;
        }
    }
    page
}

fn bench_extraction(c: &mut Criterion) {
    let page = create_test_page(2_000);
    c.bench_function("extract_2000_runs", |b| {
        b.iter(|| {
            let runs = extract_runs(black_box(&page)).unwrap();
            black_box(runs.len())
        })
    });
}

fn bench_pagination(c: &mut Criterion) {
    let page = create_test_page(2_000);

    let mut group = c.benchmark_group("reflow_2000_runs");
    for (name, mode) in [
        ("normal", ReflowMode::Normal),
        ("image", ReflowMode::Image),
        ("no_truncate", ReflowMode::NoTruncate),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let reflowed = reflow(black_box(&page), 320.0, 480.0, mode).unwrap();
                black_box(reflowed.content_size().unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_pagination);
criterion_main!(benches);
