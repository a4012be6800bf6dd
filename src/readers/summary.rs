// src/readers/summary.rs

//! Implements `Summary` statistics tracking struct.

use crate::common::{Count, FPath};
use crate::readers::reactivequeue::SummaryReactiveQueue;
use crate::readers::recordreader::SummaryRecordReader;
use crate::readers::streamreader::SummaryStreamReader;

use std::fmt;

use ::more_asserts::debug_assert_le;

/// Accumulated statistics of processing a single file by a [`LogProcessor`]
/// and its underlying [`StreamReader`], [`ReactiveQueue`], and
/// [`RecordReader`].
///
/// For CLI option `--summary`.
///
/// [`LogProcessor`]: crate::readers::logprocessor::LogProcessor
/// [`StreamReader`]: crate::readers::streamreader::StreamReader
/// [`ReactiveQueue`]: crate::readers::reactivequeue::ReactiveQueue
/// [`RecordReader`]: crate::readers::recordreader::RecordReader
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// the `FPath` of the processed file
    pub path: FPath,
    pub stream: SummaryStreamReader,
    pub queue: SummaryReactiveQueue,
    pub records: SummaryRecordReader,
    /// The first error that occurred during processing, if any.
    pub error: Option<String>,
}

impl Summary {
    pub fn new(
        path: FPath,
        stream: SummaryStreamReader,
        queue: SummaryReactiveQueue,
        records: SummaryRecordReader,
    ) -> Summary {
        debug_assert_le!(queue.consumed, queue.pushed);
        let error: Option<String> = stream.error.clone();

        Summary {
            path,
            stream,
            queue,
            records,
            error,
        }
    }

    /// Count of `Record`s passed to observers.
    pub fn records(&self) -> Count {
        self.records.records()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "file: {:?}", self.path)?;
        writeln!(
            f,
            "  file: size {}, encoding {}, chunk size {}",
            self.stream.filesz, self.stream.encoding, self.stream.chunksz
        )?;
        writeln!(
            f,
            "  read: chunks {}, bytes {}, bytes decoded {}, pauses {}, stopped {}, end of file {}",
            self.stream.chunks,
            self.stream.bytes_read,
            self.stream.bytes_passed,
            self.stream.pauses,
            self.stream.stopped,
            self.stream.eof,
        )?;
        writeln!(
            f,
            "  queue: capacity {}, pushed {}, consumed {}, blocked {}, timeouts {}, high water {}, callback panics {}",
            self.queue.capacity,
            self.queue.pushed,
            self.queue.consumed,
            self.queue.pushes_blocked,
            self.queue.push_timeouts,
            self.queue.high_water,
            self.queue.callback_panics,
        )?;
        let assembler = &self.records.assembler;
        writeln!(
            f,
            "  lines: {}, CRLF {}, invalid UTF-8 {}, longest {}",
            assembler.lines, assembler.lines_crlf, assembler.lines_lossy, assembler.line_len_max,
        )?;
        writeln!(
            f,
            "  records: {}, headers {}, continuations {}, orphans {}, observer panics {}",
            self.records.records(),
            self.records.headers,
            self.records.parts,
            self.records.orphans,
            self.records.observer_panics,
        )?;
        match &self.error {
            Some(error) => write!(f, "  error: {}", error),
            None => write!(f, "  error: None"),
        }
    }
}
