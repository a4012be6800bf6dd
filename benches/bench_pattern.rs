// bench_pattern.rs
//
// benchmark functions of `lhlib::data::pattern::LinePattern` and
// `lhlib::readers::recordreader::RecordReader`
//

#![allow(non_snake_case)]

extern crate lhlib;

use lhlib::data::field::{DateFormat, Field, TimeFraction};
use lhlib::data::pattern::{LinePattern, LinePatternP};
use lhlib::readers::recordreader::{ObserverList, ObserverListP, RecordReader};

extern crate criterion;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const TEMPLATE: &str = "[{} {}] [{}] [{}] {}";

const LINE_HEADER: &str = "[2023-07-19 12:55:48.691] [Main] [debug] Hello World";

const LINE_PART: &str = "    at com.example.Main.run(Main.java:42)";

fn new_LinePattern() -> LinePattern {
    let fields = vec![
        Field::date(DateFormat::Ymd),
        Field::time(TimeFraction::milliseconds()),
        Field::logger_name(),
        Field::level(),
        Field::message(),
    ];
    match LinePattern::new(TEMPLATE, fields) {
        Ok(val) => val,
        Err(err) => {
            panic!("LinePattern::new({:?}) error {}", TEMPLATE, err);
        }
    }
}

/// A log of `count` records, every fourth a header followed by three
/// continuation lines.
fn make_log(count: usize) -> String {
    let mut log = String::with_capacity(count * 56);
    for i in 0..count {
        if i % 4 == 0 {
            log.push_str(LINE_HEADER);
        } else {
            log.push_str(LINE_PART);
        }
        log.push('\n');
    }

    log
}

#[inline(never)]
fn pattern_new() {
    black_box(new_LinePattern());
}

#[inline(never)]
fn pattern_match_header(pattern: &LinePattern) {
    black_box(pattern.match_line(black_box(LINE_HEADER)));
}

#[inline(never)]
fn pattern_match_part(pattern: &LinePattern) {
    black_box(pattern.match_line(black_box(LINE_PART)));
}

#[inline(never)]
fn recordreader_process(
    pattern: &LinePatternP,
    log: &[u8],
    chunksz: usize,
) {
    let observers: ObserverListP = ObserverListP::new(ObserverList::new());
    let mut reader = RecordReader::new(pattern.clone(), observers);
    for chunk in log.chunks(chunksz) {
        reader.process_chunk(chunk);
    }
    reader.finish();
    black_box(reader.summary());
}

// criterion runners

fn criterion_benchmark(c: &mut Criterion) {
    let pattern: LinePatternP = LinePatternP::new(new_LinePattern());
    let log: String = make_log(1000);

    let mut bg = c.benchmark_group("LinePattern");
    bg.bench_function("pattern_new", |b| b.iter(pattern_new));
    bg.bench_function("pattern_match_header", |b| b.iter(|| pattern_match_header(&pattern)));
    bg.bench_function("pattern_match_part", |b| b.iter(|| pattern_match_part(&pattern)));
    bg.finish();

    let mut bg = c.benchmark_group("RecordReader");
    bg.bench_function("recordreader_process_0x40", |b| {
        b.iter(|| recordreader_process(&pattern, log.as_bytes(), 0x40))
    });
    bg.bench_function("recordreader_process_0x8000", |b| {
        b.iter(|| recordreader_process(&pattern, log.as_bytes(), 0x8000))
    });
    bg.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
