// src/readers/linereader.rs

//! Implements a [`LineAssembler`], the driver for splitting chunks of bytes
//! into [`Line`]s.
//!
//! Chunks arrive in stream order and may split a line, or a UTF-8 sequence,
//! at any byte. The bytes of an unfinished line are held until its newline
//! arrives, or until [`finish`] is called at the end of the stream.
//!
//! [`finish`]: LineAssembler::finish

use crate::common::{Bytes, Count, FileOffset, LineUid, CRu8, NLu8, LINE_UID_FIRST};
#[cfg(any(debug_assertions, test))]
use crate::debug::printers::buffer_to_String_noraw;

use std::fmt;

use ::memchr::memchr_iter;
use ::min_max::max;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// One physical line, without its line ending.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Line {
    pub uid: LineUid,
    /// Offset of the first byte of the line within the stream.
    pub fileoffset: FileOffset,
    /// Text of the line. Invalid UTF-8 sequences become `'\u{FFFD}'`.
    pub text: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text.as_str())
    }
}

/// Statistics of a [`LineAssembler`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SummaryLineAssembler {
    /// Chunks received.
    pub chunks: Count,
    /// Bytes received.
    pub bytes: Count,
    /// Lines emitted.
    pub lines: Count,
    /// Lines that ended with `"\r\n"`.
    pub lines_crlf: Count,
    /// Lines with invalid UTF-8.
    pub lines_lossy: Count,
    /// Longest line in bytes, without line ending.
    pub line_len_max: usize,
}

/// Splits a stream of byte chunks into numbered [`Line`]s.
#[derive(Debug)]
pub struct LineAssembler {
    /// Bytes of the unfinished line.
    buffer: Bytes,
    /// Stream offset of the next byte to be received.
    cursor: FileOffset,
    /// Stream offset of the first byte in `buffer`.
    line_start: FileOffset,
    next_uid: LineUid,
    summary: SummaryLineAssembler,
}

impl Default for LineAssembler {
    fn default() -> Self {
        LineAssembler::new()
    }
}

impl LineAssembler {
    pub fn new() -> LineAssembler {
        LineAssembler {
            buffer: Bytes::with_capacity(256),
            cursor: 0,
            line_start: 0,
            next_uid: LINE_UID_FIRST,
            summary: SummaryLineAssembler::default(),
        }
    }

    /// Stream offset of the next byte to be received.
    pub fn cursor(&self) -> FileOffset {
        self.cursor
    }

    /// The `uid` the next emitted `Line` will have.
    pub fn next_uid(&self) -> LineUid {
        self.next_uid
    }

    pub fn summary(&self) -> SummaryLineAssembler {
        self.summary
    }

    /// Append `chunk` to the stream, passing each completed `Line` to `emit`.
    pub fn push_chunk<F>(
        &mut self,
        chunk: &[u8],
        mut emit: F,
    ) where
        F: FnMut(Line),
    {
        #[cfg(any(debug_assertions, test))]
        defn!("(len {}) {:?}", chunk.len(), buffer_to_String_noraw(&chunk[..chunk.len().min(64)]));
        self.summary.chunks += 1;
        self.summary.bytes += chunk.len() as Count;
        let mut start: usize = 0;
        for index in memchr_iter(NLu8, chunk) {
            self.buffer
                .extend_from_slice(&chunk[start..index]);
            let line: Line = self.take_line();
            emit(line);
            start = index + 1;
            self.line_start = self.cursor + start as FileOffset;
        }
        self.buffer
            .extend_from_slice(&chunk[start..]);
        self.cursor += chunk.len() as FileOffset;
        defx!("cursor {}, held {}", self.cursor, self.buffer.len());
    }

    /// End of stream. Emit the held bytes as a last `Line`, if any.
    pub fn finish<F>(
        &mut self,
        mut emit: F,
    ) where
        F: FnMut(Line),
    {
        if self.buffer.is_empty() {
            defñ!("nothing held");
            return;
        }
        defñ!("held {}", self.buffer.len());
        let line: Line = self.take_line();
        emit(line);
        self.line_start = self.cursor;
    }

    /// Make a `Line` from `buffer` and clear `buffer`.
    fn take_line(&mut self) -> Line {
        if self.buffer.last() == Some(&CRu8) {
            self.buffer.pop();
            self.summary.lines_crlf += 1;
        }
        self.summary.line_len_max = max!(self.summary.line_len_max, self.buffer.len());
        let text: String = match String::from_utf8(std::mem::take(&mut self.buffer)) {
            Ok(text) => text,
            Err(err) => {
                self.summary.lines_lossy += 1;
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        let line = Line {
            uid: self.next_uid,
            fileoffset: self.line_start,
            text,
        };
        self.next_uid += 1;
        self.summary.lines += 1;

        line
    }
}
