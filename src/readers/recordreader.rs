// src/readers/recordreader.rs

//! Implements a [`RecordReader`], the driver for deriving [`Record`]s from
//! chunks of bytes, and [`RecordObserver`], the receiver of `Record`s.
//!
//! A `RecordReader` drives a [`LineAssembler`] to derive [`Line`]s.
//! Each `Line` is classified by a [`RecordClassifier`]:
//!
//! * a `Line` matching the [`LinePattern`] becomes a header record
//!   ([`RecordKind::HeaderAndMessage`])
//! * any other `Line` becomes a continuation record
//!   ([`RecordKind::MessagePart`]) whose parent is the most recent header
//!   record
//!
//! A continuation before any header record is an _orphan_; it has no parent.
//!
//! Each `Record` is passed to every attached `RecordObserver`, in attach
//! order, before the next `Line` is classified. So observers receive
//! `Record`s in `uid` order.
//!
//! [`Record`]: crate::data::record::Record
//! [`RecordKind::HeaderAndMessage`]: crate::data::record::RecordKind::HeaderAndMessage
//! [`RecordKind::MessagePart`]: crate::data::record::RecordKind::MessagePart
//! [`LinePattern`]: crate::data::pattern::LinePattern
//! [`LineAssembler`]: crate::readers::linereader::LineAssembler
//! [`Line`]: crate::readers::linereader::Line

use crate::common::{Count, LineUid, ParentUid};
use crate::data::pattern::LinePatternP;
use crate::data::record::{Record, RecordP};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::readers::linereader::{Line, LineAssembler, SummaryLineAssembler};

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// observers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Receives each [`Record`] from a [`RecordReader`].
///
/// Called on the thread that drives the `RecordReader`. An implementation
/// that blocks stalls the reader; hand records to another thread instead,
/// e.g. with a [`ChannelObserver`].
///
/// [`ChannelObserver`]: crate::observers::adapters::ChannelObserver
pub trait RecordObserver: Send + Sync {
    /// Called once per `Record`, in `uid` order.
    fn on_record(
        &self,
        record: &RecordP,
    );

    /// Called once after the last `Record`.
    fn on_eof(&self) {}
}

/// Shared pointer to a [`RecordObserver`]. Identity is the pointer.
pub type ObserverP = Arc<dyn RecordObserver>;

/// The `RecordObserver`s attached to a [`RecordReader`].
///
/// May be changed from any thread while records are being read. A change
/// takes effect from the next `Record`.
#[derive(Default)]
pub struct ObserverList {
    list: RwLock<Vec<ObserverP>>,
}

pub type ObserverListP = Arc<ObserverList>;

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}

/// Compare only the data pointers; vtable pointers of the same type may
/// differ.
fn observer_eq(
    a: &ObserverP,
    b: &ObserverP,
) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl ObserverList {
    pub fn new() -> ObserverList {
        ObserverList::default()
    }

    /// Attach `observer`. Returns `false` if it is already attached.
    pub fn attach(
        &self,
        observer: ObserverP,
    ) -> bool {
        let mut list = self
            .list
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if list.iter().any(|o| observer_eq(o, &observer)) {
            defñ!("already attached");
            return false;
        }
        list.push(observer);
        defñ!("attached; {} observers", list.len());

        true
    }

    /// Detach `observer`. Returns `false` if it was not attached.
    pub fn detach(
        &self,
        observer: &ObserverP,
    ) -> bool {
        let mut list = self
            .list
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match list
            .iter()
            .position(|o| observer_eq(o, observer))
        {
            Some(index) => {
                list.remove(index);
                defñ!("detached; {} observers", list.len());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the attached observers. Observers are called from a copy so an
    /// observer may attach or detach without deadlock.
    pub fn snapshot(&self) -> Vec<ObserverP> {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RecordClassifier
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Makes a [`Record`] from each [`Line`], linking continuations to their
/// header record.
#[derive(Debug)]
pub struct RecordClassifier {
    pattern: LinePatternP,
    /// `uid` of the most recent header record.
    last_header_uid: ParentUid,
    headers: Count,
    parts: Count,
    orphans: Count,
}

impl RecordClassifier {
    pub fn new(pattern: LinePatternP) -> RecordClassifier {
        RecordClassifier {
            pattern,
            last_header_uid: None,
            headers: 0,
            parts: 0,
            orphans: 0,
        }
    }

    pub fn pattern(&self) -> &LinePatternP {
        &self.pattern
    }

    pub fn last_header_uid(&self) -> ParentUid {
        self.last_header_uid
    }

    pub fn classify(
        &mut self,
        line: Line,
    ) -> Record {
        match self.pattern.match_line(line.text.as_str()) {
            Some(fields) => {
                self.last_header_uid = Some(line.uid);
                self.headers += 1;
                defñ!("line {} header", line.uid);

                Record::new_header(line.uid, fields, line.text, line.fileoffset)
            }
            None => {
                self.parts += 1;
                if self.last_header_uid.is_none() {
                    self.orphans += 1;
                    de_wrn!("line {} precedes any header line; it has no parent", line.uid);
                }
                defñ!("line {} part of {:?}", line.uid, self.last_header_uid);

                Record::new_part(line.uid, self.last_header_uid, line.text, line.fileoffset)
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RecordReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Statistics of a [`RecordReader`], for CLI option `--summary`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SummaryRecordReader {
    pub assembler: SummaryLineAssembler,
    /// `HeaderAndMessage` records.
    pub headers: Count,
    /// `MessagePart` records, including orphans.
    pub parts: Count,
    /// `MessagePart` records with no parent.
    pub orphans: Count,
    /// `RecordObserver` calls that panicked.
    pub observer_panics: Count,
    /// `uid` of the last record.
    pub uid_last: Option<LineUid>,
}

impl SummaryRecordReader {
    pub fn records(&self) -> Count {
        self.headers + self.parts
    }
}

/// Derives [`Record`]s from chunks of bytes and passes them to the attached
/// [`RecordObserver`]s. See the [module documentation].
///
/// [module documentation]: self
#[derive(Debug)]
pub struct RecordReader {
    assembler: LineAssembler,
    classifier: RecordClassifier,
    observers: ObserverListP,
    observer_panics: Count,
    uid_last: Option<LineUid>,
    finished: bool,
}

/// Pass `record` to each of `observers`. Returns the count of panics.
fn notify(
    observers: &ObserverList,
    record: &RecordP,
) -> Count {
    let mut panics: Count = 0;
    for observer in observers.snapshot().iter() {
        if catch_unwind(AssertUnwindSafe(|| observer.on_record(record))).is_err() {
            e_err!("RecordObserver panicked on record {}", record.uid());
            panics += 1;
        }
    }

    panics
}

impl RecordReader {
    pub fn new(
        pattern: LinePatternP,
        observers: ObserverListP,
    ) -> RecordReader {
        RecordReader {
            assembler: LineAssembler::new(),
            classifier: RecordClassifier::new(pattern),
            observers,
            observer_panics: 0,
            uid_last: None,
            finished: false,
        }
    }

    pub fn observers(&self) -> &ObserverListP {
        &self.observers
    }

    pub fn last_header_uid(&self) -> ParentUid {
        self.classifier.last_header_uid()
    }

    /// Split `chunk` into lines; classify each and notify the observers.
    pub fn process_chunk(
        &mut self,
        chunk: &[u8],
    ) {
        debug_assert!(!self.finished, "process_chunk after finish");
        let classifier = &mut self.classifier;
        let observers = &self.observers;
        let observer_panics = &mut self.observer_panics;
        let uid_last = &mut self.uid_last;
        self.assembler
            .push_chunk(chunk, |line| {
                let record: RecordP = Arc::new(classifier.classify(line));
                *uid_last = Some(record.uid());
                *observer_panics += notify(observers, &record);
            });
    }

    /// End of stream. Classify the last unterminated line, if any, then call
    /// `on_eof` of each observer. Only the first call does anything.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        defn!();
        self.finished = true;
        let classifier = &mut self.classifier;
        let observers = &self.observers;
        let observer_panics = &mut self.observer_panics;
        let uid_last = &mut self.uid_last;
        self.assembler
            .finish(|line| {
                let record: RecordP = Arc::new(classifier.classify(line));
                *uid_last = Some(record.uid());
                *observer_panics += notify(observers, &record);
            });
        for observer in self.observers.snapshot().iter() {
            if catch_unwind(AssertUnwindSafe(|| observer.on_eof())).is_err() {
                e_err!("RecordObserver panicked on eof");
                self.observer_panics += 1;
            }
        }
        defx!("uid_last {:?}", self.uid_last);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn summary(&self) -> SummaryRecordReader {
        SummaryRecordReader {
            assembler: self.assembler.summary(),
            headers: self.classifier.headers,
            parts: self.classifier.parts,
            orphans: self.classifier.orphans,
            observer_panics: self.observer_panics,
            uid_last: self.uid_last,
        }
    }
}
