//! Benchmarks for smartmd formatting performance.
//!
//! Run with: cargo bench
//!
//! Documents are synthesized at several section counts so parse, analysis
//! and full formatting can be compared as input grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use smartmd::{FormattingConfig, MarkdownParser, SmartMarkdownFormatter};

/// Creates a mixed markdown document with the given number of sections.
fn create_test_document(section_count: usize) -> String {
    let mut doc = String::from("# Benchmark Document\n");

    for i in 0..section_count {
        doc.push_str(&format!(
            "## Section {i}\nThis is paragraph {i} with some test content for benchmarking purposes.\n\
             한글 테스트 내용도 포함합니다.\n\
             * first item\n* second item\n    * nested item\n\
             7. step one\n3. step two\n\
             ```\nfunction handler{i}() {{\n  const value = {i};\n  return value;\n}}\n```\n\
             | name | value |\n|---|---|\n| key{i} | {i} |\n\n\
             > Note: remember section {i}\n\n\n\n"
        ));
    }

    doc
}

/// Benchmark parsing into the block AST.
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    let parser = MarkdownParser::new();

    for section_count in [10, 100, 500].iter() {
        let doc = create_test_document(*section_count);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("sections", section_count),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let _ = parser.parse(black_box(doc));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark content analysis.
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let formatter = SmartMarkdownFormatter::default();

    for section_count in [10, 100, 500].iter() {
        let doc = create_test_document(*section_count);
        group.bench_with_input(
            BenchmarkId::new("sections", section_count),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let _ = formatter.analyze_document(black_box(doc));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the full formatting pipeline.
fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    let formatter = SmartMarkdownFormatter::default();

    for section_count in [10, 100, 500].iter() {
        let doc = create_test_document(*section_count);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("sections", section_count),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let _ = formatter.format_document(black_box(doc));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark quick formatting against the full pipeline on one size.
fn bench_quick_format(c: &mut Criterion) {
    let formatter = SmartMarkdownFormatter::default();
    let doc = create_test_document(100);

    c.bench_function("quick_format_100", |b| {
        b.iter(|| formatter.quick_format(black_box(&doc)));
    });
}

/// Benchmark parallel batch formatting.
fn bench_batch(c: &mut Criterion) {
    let docs: Vec<String> = (0..32).map(|_| create_test_document(20)).collect();
    let texts: Vec<&str> = docs.iter().map(String::as_str).collect();
    let config = FormattingConfig::default();

    c.bench_function("format_documents_32x20", |b| {
        b.iter(|| smartmd::format_documents(black_box(&texts), &config));
    });
}

criterion_group!(
    benches,
    bench_parsing,
    bench_analysis,
    bench_formatting,
    bench_quick_format,
    bench_batch,
);
criterion_main!(benches);
