// src/tests/record_tests.rs

//! tests for `record.rs`

#![allow(non_snake_case)]

use crate::data::field::{FieldKind, LogLevel};
use crate::data::record::{Record, RecordKind};
use crate::tests::common::pattern_std;

use ::test_case::test_case;

fn header(line: &str) -> Record {
    let fields = pattern_std()
        .match_line(line)
        .unwrap();

    Record::new_header(3, fields, String::from(line), 100)
}

#[test]
fn test_Record_new_header() {
    let line = "[2023-07-19 12:55:48.691] [Main] [error] Boom";
    let record = header(line);
    assert_eq!(record.uid(), 3);
    assert_eq!(record.parent_uid(), None);
    assert_eq!(record.kind(), RecordKind::HeaderAndMessage);
    assert!(record.is_header());
    assert!(!record.is_orphan());
    assert_eq!(record.fields().len(), 5);
    assert_eq!(record.raw_text(), line);
    assert_eq!(record.fileoffset(), 100);
    assert_eq!(record.message(), "Boom");
    assert_eq!(record.level(), Some(LogLevel::Error));
    assert_eq!(record.value(FieldKind::LoggerName), Some("Main"));
    assert_eq!(record.value(FieldKind::ThreadId), None);
    assert!(record.get(FieldKind::Time).is_some());
    assert_eq!(record.to_string(), line);
}

#[test_case(Some(3), false; "with parent")]
#[test_case(None, true; "orphan")]
fn test_Record_new_part(
    parent_uid: Option<u64>,
    orphan: bool,
) {
    let record = Record::new_part(4, parent_uid, String::from("  at frame1"), 150);
    assert_eq!(record.uid(), 4);
    assert_eq!(record.parent_uid(), parent_uid);
    assert_eq!(record.kind(), RecordKind::MessagePart);
    assert!(!record.is_header());
    assert_eq!(record.is_orphan(), orphan);
    assert!(record.fields().is_empty());
    assert_eq!(record.message(), "  at frame1");
    assert_eq!(record.level(), None);
    assert_eq!(record.value(FieldKind::Message), None);
}

#[test]
fn test_RecordKind_display() {
    assert_eq!(RecordKind::HeaderAndMessage.to_string(), "HeaderAndMessage");
    assert_eq!(RecordKind::MessagePart.to_string(), "MessagePart");
}
