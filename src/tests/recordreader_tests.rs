// src/tests/recordreader_tests.rs

//! tests for `recordreader.rs`

#![allow(non_snake_case)]

use crate::data::field::LogLevel;
use crate::data::record::RecordKind;
use crate::readers::recordreader::{
    ObserverList,
    ObserverListP,
    ObserverP,
    RecordClassifier,
    RecordReader,
};
use crate::readers::linereader::Line;
use crate::tests::common::{
    pattern_std,
    CollectObserver,
    PanicObserver,
    RecordTuple,
    LOG_1,
    LOG_2,
    LOG_3,
    LOG_MIXED,
};

use std::sync::Arc;

use ::test_case::test_case;

/// Pass `data` to a new `RecordReader` in chunks of `chunksz` bytes.
/// Returns the collected records and the reader.
fn read(
    data: &str,
    chunksz: usize,
) -> (Arc<CollectObserver>, RecordReader) {
    let observers: ObserverListP = ObserverListP::new(ObserverList::new());
    let collect = Arc::new(CollectObserver::new());
    observers.attach(collect.clone());
    let mut reader = RecordReader::new(pattern_std(), observers);
    for chunk in data.as_bytes().chunks(chunksz) {
        reader.process_chunk(chunk);
    }
    reader.finish();

    (collect, reader)
}

fn tuple(
    uid: u64,
    parent: Option<u64>,
    kind: RecordKind,
    text: &str,
) -> RecordTuple {
    (uid, parent, kind, String::from(text))
}

#[test]
fn test_RecordReader_one_header() {
    let (collect, reader) = read(LOG_1, 32768);
    let records = collect.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.uid(), 1);
    assert!(record.is_header());
    assert_eq!(record.message(), "Hello World");
    assert_eq!(record.level(), Some(LogLevel::Debug));
    assert_eq!(collect.eofs(), 1);
    let summary = reader.summary();
    assert_eq!(summary.headers, 1);
    assert_eq!(summary.parts, 0);
    assert_eq!(summary.records(), 1);
    assert_eq!(summary.uid_last, Some(1));
}

#[test]
fn test_RecordReader_continuations() {
    let (collect, reader) = read(LOG_2, 32768);
    assert_eq!(
        collect.tuples(),
        vec![
            tuple(1, None, RecordKind::HeaderAndMessage, "[2023-07-19 12:55:48.691] [Main] [error] Boom"),
            tuple(2, Some(1), RecordKind::MessagePart, "  at frame1"),
            tuple(3, Some(1), RecordKind::MessagePart, "  at frame2"),
        ]
    );
    assert_eq!(reader.last_header_uid(), Some(1));
    assert_eq!(reader.summary().orphans, 0);
}

#[test]
fn test_RecordReader_last_line_no_newline() {
    let (collect, _reader) = read(LOG_3, 32768);
    let records = collect.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message(), "last line");
    assert_eq!(records[0].level(), Some(LogLevel::Info));
}

#[test]
fn test_RecordReader_empty() {
    let (collect, reader) = read("", 32768);
    assert!(collect.records().is_empty());
    assert_eq!(collect.eofs(), 1);
    assert_eq!(reader.summary().uid_last, None);
}

#[test]
fn test_RecordReader_mixed() {
    let (collect, reader) = read(LOG_MIXED, 32768);
    let tuples = collect.tuples();
    let kinds: Vec<(u64, Option<u64>, RecordKind)> = tuples
        .iter()
        .map(|(uid, parent, kind, _)| (*uid, *parent, *kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (1, None, RecordKind::MessagePart),
            (2, None, RecordKind::HeaderAndMessage),
            (3, None, RecordKind::HeaderAndMessage),
            (4, Some(3), RecordKind::MessagePart),
            (5, None, RecordKind::HeaderAndMessage),
            (6, Some(5), RecordKind::MessagePart),
            (7, Some(5), RecordKind::MessagePart),
            (8, Some(5), RecordKind::MessagePart),
            (9, None, RecordKind::HeaderAndMessage),
            (10, None, RecordKind::HeaderAndMessage),
            (11, None, RecordKind::HeaderAndMessage),
        ]
    );
    let records = collect.records();
    assert!(records[0].is_orphan());
    // CR of the CRLF ending is removed
    assert_eq!(records[4].message(), "failed");
    assert_eq!(records[7].raw_text(), "");
    assert_eq!(records[9].level(), Some(LogLevel::Unknown));
    assert_eq!(records[10].raw_text(), "[2023-07-19 12:55:51.000] [Main] [debug] done");
    let summary = reader.summary();
    assert_eq!(summary.headers, 6);
    assert_eq!(summary.parts, 5);
    assert_eq!(summary.orphans, 1);
    assert_eq!(summary.records(), 11);
    assert_eq!(summary.assembler.lines_crlf, 1);
}

#[test_case(1)]
#[test_case(2)]
#[test_case(13)]
#[test_case(100)]
fn test_RecordReader_chunk_size_invariant(chunksz: usize) {
    let (collect_big, _) = read(LOG_MIXED, 32768);
    let (collect, _) = read(LOG_MIXED, chunksz);
    assert_eq!(collect.tuples(), collect_big.tuples());
    let offsets: Vec<u64> = collect
        .records()
        .iter()
        .map(|r| r.fileoffset())
        .collect();
    let offsets_big: Vec<u64> = collect_big
        .records()
        .iter()
        .map(|r| r.fileoffset())
        .collect();
    assert_eq!(offsets, offsets_big);
}

#[test]
fn test_RecordReader_finish_idempotent() {
    let observers: ObserverListP = ObserverListP::new(ObserverList::new());
    let collect = Arc::new(CollectObserver::new());
    observers.attach(collect.clone());
    let mut reader = RecordReader::new(pattern_std(), observers);
    reader.process_chunk(LOG_3.as_bytes());
    assert!(!reader.is_finished());
    reader.finish();
    reader.finish();
    assert!(reader.is_finished());
    assert_eq!(collect.records().len(), 1);
    assert_eq!(collect.eofs(), 1);
}

#[test]
fn test_RecordReader_observer_order() {
    let observers: ObserverListP = ObserverListP::new(ObserverList::new());
    let collect_a = Arc::new(CollectObserver::new());
    let collect_b = Arc::new(CollectObserver::new());
    observers.attach(collect_a.clone());
    observers.attach(collect_b.clone());
    let mut reader = RecordReader::new(pattern_std(), observers);
    reader.process_chunk(LOG_2.as_bytes());
    reader.finish();
    assert_eq!(collect_a.tuples(), collect_b.tuples());
    // both observers share the same `Record`
    assert!(Arc::ptr_eq(&collect_a.records()[0], &collect_b.records()[0]));
}

#[test]
fn test_RecordReader_observer_panic_contained() {
    let observers: ObserverListP = ObserverListP::new(ObserverList::new());
    let panicker: ObserverP = Arc::new(PanicObserver::default());
    let collect = Arc::new(CollectObserver::new());
    observers.attach(panicker);
    observers.attach(collect.clone());
    let mut reader = RecordReader::new(pattern_std(), observers);
    reader.process_chunk(LOG_2.as_bytes());
    reader.finish();
    assert_eq!(collect.records().len(), 3);
    assert_eq!(collect.eofs(), 1);
    assert_eq!(reader.summary().observer_panics, 3);
}

#[test]
fn test_RecordReader_detach_between_chunks() {
    let observers: ObserverListP = ObserverListP::new(ObserverList::new());
    let collect = Arc::new(CollectObserver::new());
    let collect_p: ObserverP = collect.clone();
    observers.attach(collect_p.clone());
    let mut reader = RecordReader::new(pattern_std(), observers.clone());
    reader.process_chunk(LOG_1.as_bytes());
    assert!(observers.detach(&collect_p));
    reader.process_chunk(LOG_2.as_bytes());
    reader.finish();
    assert_eq!(collect.records().len(), 1);
    assert_eq!(collect.eofs(), 0);
    // uids continue across chunks regardless of observers
    assert_eq!(reader.summary().uid_last, Some(4));
}

#[test]
fn test_ObserverList_attach_detach() {
    let observers = ObserverList::new();
    assert!(observers.is_empty());
    let a: ObserverP = Arc::new(CollectObserver::new());
    let b: ObserverP = Arc::new(CollectObserver::new());
    assert!(observers.attach(a.clone()));
    assert!(!observers.attach(a.clone()), "attached twice");
    assert!(observers.attach(b.clone()));
    assert_eq!(observers.len(), 2);
    assert!(observers.detach(&a));
    assert!(!observers.detach(&a), "detached twice");
    assert_eq!(observers.len(), 1);
    assert!(Arc::ptr_eq(&observers.snapshot()[0], &b));
}

#[test]
fn test_RecordClassifier_orphans() {
    let mut classifier = RecordClassifier::new(pattern_std());
    let line = |uid: u64, text: &str| Line {
        uid,
        fileoffset: 0,
        text: String::from(text),
    };
    let r1 = classifier.classify(line(1, "orphan 1"));
    let r2 = classifier.classify(line(2, "orphan 2"));
    let r3 = classifier.classify(line(3, "[2023-07-19 12:55:48.691] [Main] [info] hi"));
    let r4 = classifier.classify(line(4, "part"));
    assert!(r1.is_orphan());
    assert!(r2.is_orphan());
    assert!(r3.is_header());
    assert_eq!(r4.parent_uid(), Some(3));
    assert_eq!(classifier.last_header_uid(), Some(3));
}
