// src/data/record.rs

//! Implements [`Record`], the structured result made from one line.

use crate::common::{FileOffset, LineUid, ParentUid};
use crate::data::field::{Field, FieldKind, Fields, LogLevel};

use std::fmt;
use std::sync::Arc;

use ::more_asserts::debug_assert_ge;

/// Classification of a [`Record`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RecordKind {
    /// The line matched the [`LinePattern`]; the `Record` has `Field`s.
    ///
    /// [`LinePattern`]: crate::data::pattern::LinePattern
    HeaderAndMessage,
    /// The line did not match; it continues the message of the most recent
    /// `HeaderAndMessage` record.
    MessagePart,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordKind::HeaderAndMessage => write!(f, "HeaderAndMessage"),
            RecordKind::MessagePart => write!(f, "MessagePart"),
        }
    }
}

/// One line of a log file, classified and numbered.
///
/// Immutable after creation. Shared with observers as a [`RecordP`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    uid: LineUid,
    parent_uid: ParentUid,
    kind: RecordKind,
    /// Captured fields; empty for a `MessagePart`.
    fields: Fields,
    /// The full line, without line ending.
    raw_text: String,
    /// Offset of the start of the line within the decoded stream.
    fileoffset: FileOffset,
}

/// Thread-safe [Atomic Reference Counting Pointer] to a [`Record`].
///
/// [Atomic Reference Counting Pointer]: std::sync::Arc
pub type RecordP = Arc<Record>;

impl Record {
    /// Create a header record from the `fields` captured from `raw_text`.
    pub fn new_header(
        uid: LineUid,
        fields: Fields,
        raw_text: String,
        fileoffset: FileOffset,
    ) -> Record {
        debug_assert_ge!(uid, crate::common::LINE_UID_FIRST);
        Record {
            uid,
            parent_uid: None,
            kind: RecordKind::HeaderAndMessage,
            fields,
            raw_text,
            fileoffset,
        }
    }

    /// Create a continuation record. `parent_uid` is `None` for an orphan
    /// continuation, i.e. one that precedes any header record.
    pub fn new_part(
        uid: LineUid,
        parent_uid: ParentUid,
        raw_text: String,
        fileoffset: FileOffset,
    ) -> Record {
        debug_assert_ge!(uid, crate::common::LINE_UID_FIRST);
        debug_assert!(
            parent_uid.map_or(true, |p| p < uid),
            "parent_uid {:?} must precede uid {}",
            parent_uid,
            uid
        );
        Record {
            uid,
            parent_uid,
            kind: RecordKind::MessagePart,
            fields: Fields::new(),
            raw_text,
            fileoffset,
        }
    }

    pub fn uid(&self) -> LineUid {
        self.uid
    }

    pub fn parent_uid(&self) -> ParentUid {
        self.parent_uid
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn is_header(&self) -> bool {
        matches!(self.kind, RecordKind::HeaderAndMessage)
    }

    /// A continuation with no preceding header record.
    pub fn is_orphan(&self) -> bool {
        matches!(self.kind, RecordKind::MessagePart) && self.parent_uid.is_none()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn raw_text(&self) -> &str {
        self.raw_text.as_str()
    }

    pub fn fileoffset(&self) -> FileOffset {
        self.fileoffset
    }

    /// The first `Field` of `kind`, if any.
    pub fn get(
        &self,
        kind: FieldKind,
    ) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.kind() == kind)
    }

    /// The captured text of the first `Field` of `kind`, if any.
    pub fn value(
        &self,
        kind: FieldKind,
    ) -> Option<&str> {
        self.get(kind)?.value()
    }

    /// The message text. For a header record this is the `Message` field
    /// (empty if the pattern has none). For a continuation this is the whole
    /// line.
    pub fn message(&self) -> &str {
        match self.kind {
            RecordKind::HeaderAndMessage => self.value(FieldKind::Message).unwrap_or(""),
            RecordKind::MessagePart => self.raw_text.as_str(),
        }
    }

    /// The severity of a header record's `Level` field, if it has one.
    pub fn level(&self) -> Option<LogLevel> {
        self.get(FieldKind::Level)?
            .as_level()
            .map(|level| level.level())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.raw_text.as_str())
    }
}
