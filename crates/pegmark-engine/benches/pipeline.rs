use criterion::{Criterion, criterion_group, criterion_main};
use pegmark_engine::{Driver, Extensions, HtmlFormatter};
use std::hint::black_box;
mod common;

fn bench_to_html(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    let content = common::generate_markdown_content(100);
    let mut driver = Driver::new(Extensions::default());
    group.bench_function("flat_document", |b| {
        b.iter(|| {
            let mut formatter = HtmlFormatter::new(Vec::new());
            driver
                .markdown(black_box(content.as_bytes()), &mut formatter)
                .unwrap();
            black_box(formatter.into_inner());
        });
    });

    group.finish();
}

fn bench_raw_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_resolution");
    group.sample_size(10);

    let content = common::generate_nested_lists(6, 50);
    let mut driver = Driver::new(Extensions {
        smart: true,
        notes: true,
        ..Extensions::default()
    });
    group.bench_function("nested_lists", |b| {
        b.iter(|| {
            let mut formatter = HtmlFormatter::new(Vec::new());
            driver
                .markdown(black_box(content.as_bytes()), &mut formatter)
                .unwrap();
            black_box(formatter.into_inner());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_to_html, bench_raw_resolution);
criterion_main!(benches);
