// src/tests/common.rs

//! Common data and helpers for tests.

#![allow(non_upper_case_globals)]

use crate::common::LineUid;
use crate::data::field::{DateFormat, Field, Fields, TimeFraction};
use crate::data::pattern::{LinePattern, LinePatternP};
use crate::data::record::{RecordKind, RecordP};
use crate::readers::recordreader::RecordObserver;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Template of lines like
/// `[2023-07-19 12:55:48.691] [Main] [debug] Hello World`.
pub const TEMPLATE_STD: &str = "[{} {}] [{}] [{}] {}";

/// The `Field`s paired with `TEMPLATE_STD`.
pub fn fields_std() -> Fields {
    vec![
        Field::date(DateFormat::Ymd),
        Field::time(TimeFraction::milliseconds()),
        Field::logger_name(),
        Field::level(),
        Field::message(),
    ]
}

pub fn pattern_std() -> LinePatternP {
    LinePatternP::new(LinePattern::new(TEMPLATE_STD, fields_std()).unwrap())
}

/// One header line.
pub const LOG_1: &str = "[2023-07-19 12:55:48.691] [Main] [debug] Hello World\n";

/// One header line with two continuation lines.
pub const LOG_2: &str = "\
[2023-07-19 12:55:48.691] [Main] [error] Boom
  at frame1
  at frame2
";

/// One header line with no trailing newline.
pub const LOG_3: &str = "[2023-07-19 12:55:48.691] [Main] [info] last line";

/// Orphan continuation, headers of many levels, continuations, a blank line,
/// a CRLF line ending, and no trailing newline.
pub const LOG_MIXED: &str = "\
orphan line before any header
[2023-07-19 12:55:48.100] [Main] [info] started
[2023-07-19 12:55:48.900] [Net] [warn] slow response
  retrying
[2023-07-19 12:55:49.001] [Net] [error] failed\r
  at net::connect
  at net::retry

[2023-07-19 12:55:50.000] [Main] [critical] giving up
[2023-07-19 12:55:50.500] [Main] [notice] custom level name
[2023-07-19 12:55:51.000] [Main] [debug] done";

/// Count of lines in `LOG_MIXED`.
pub const LOG_MIXED_LINES: usize = 11;

/// `(uid, parent_uid, kind, raw_text)` of a `Record`, for comparisons.
pub type RecordTuple = (LineUid, Option<LineUid>, RecordKind, String);

pub fn record_tuple(record: &RecordP) -> RecordTuple {
    (record.uid(), record.parent_uid(), record.kind(), String::from(record.raw_text()))
}

/// A `RecordObserver` saving every record.
#[derive(Debug, Default)]
pub struct CollectObserver {
    pub records: Mutex<Vec<RecordP>>,
    pub eofs: AtomicUsize,
}

impl CollectObserver {
    pub fn new() -> CollectObserver {
        CollectObserver::default()
    }

    pub fn records(&self) -> Vec<RecordP> {
        self.records.lock().unwrap().clone()
    }

    pub fn tuples(&self) -> Vec<RecordTuple> {
        self.records()
            .iter()
            .map(record_tuple)
            .collect()
    }

    pub fn eofs(&self) -> usize {
        self.eofs.load(Ordering::SeqCst)
    }
}

impl RecordObserver for CollectObserver {
    fn on_record(
        &self,
        record: &RecordP,
    ) {
        self.records
            .lock()
            .unwrap()
            .push(record.clone());
    }

    fn on_eof(&self) {
        self.eofs.fetch_add(1, Ordering::SeqCst);
    }
}

/// A `RecordObserver` that panics on every record.
#[derive(Debug, Default)]
pub struct PanicObserver {}

impl RecordObserver for PanicObserver {
    fn on_record(
        &self,
        record: &RecordP,
    ) {
        panic!("PanicObserver on record {}", record.uid());
    }
}
