//! Benchmarks for parsing and stringifying markdown with shortcodes.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use shortcode_core::{DelimiterGrammar, Shortcodes, TextMatcher};
use shortcode_markdown::MarkdownProcessor;

/// Generate markdown with block and inline shortcodes in every section.
fn generate_markdown(sections: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(sections * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\n");

    for i in 0..sections {
        md.push_str(&format!("## Section {i}\n\n"));
        md.push_str(&format!("[[ Youtube id={i} share-code=\"abc\" ]]\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "Paragraph {j} has **bold** text, `[[ code ]]` and [[ Vimeo id=\"{j}\" ]] inline.\n\n"
            ));
        }
    }
    md
}

fn bench_split_text(c: &mut Criterion) {
    let shortcodes = Shortcodes::default();
    let text = "Drum and Bass [[ Youtube href=\"https://youtube.com?q=test\" ]] and more [ text ] after";

    c.bench_function("split_text", |b| {
        b.iter(|| shortcodes.split(text));
    });
}

fn bench_parse_varying_sizes(c: &mut Criterion) {
    let processor = MarkdownProcessor::default();
    let mut group = c.benchmark_group("parse_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(sections, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{sections}s_{paragraphs}p")),
            &markdown,
            |b, md| b.iter(|| processor.parse(md)),
        );
    }

    group.finish();
}

fn bench_stringify(c: &mut Criterion) {
    let processor = MarkdownProcessor::default();
    let root = processor.parse(&generate_markdown(20, 3));

    c.bench_function("stringify_20_sections", |b| {
        b.iter(|| processor.stringify(&root));
    });
}

fn bench_capture_only(c: &mut Criterion) {
    let grammar = DelimiterGrammar::new("[", "]")
        .and_then(|grammar| grammar.with_capture_only(["youtube"]))
        .unwrap();
    let processor = MarkdownProcessor::new(grammar);
    let markdown = "Drum and [Bass](http://google.com) [youtube href=\"https://youtube.com?q=test\"] [other]\n\n"
        .repeat(50);

    c.bench_function("normalize_capture_only", |b| {
        b.iter(|| processor.normalize(&markdown));
    });
}

criterion_group!(
    benches,
    bench_split_text,
    bench_parse_varying_sizes,
    bench_stringify,
    bench_capture_only,
);
criterion_main!(benches);
