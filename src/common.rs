// src/common.rs

//! Common imports, type aliases, and other globals for _lhlib_ (avoids
//! circular imports).

use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[doc(hidden)]
pub use std::fs::File;

/// `F`ake `Path` or `F`ile `Path`.
pub type FPath = String;
/// File size in bytes.
pub type FileSz = u64;
/// Offset into a file, or into the decoded stream of a file, in bytes.
pub type FileOffset = u64;
/// A general-purpose counter, e.g. for summary statistics.
pub type Count = u64;

/// Sequence of Bytes.
pub type Bytes = Vec<u8>;

/// Size of one chunk read from a file, in bytes.
pub type ChunkSz = usize;

/// Size of a "kilobyte".
pub const KIB: ChunkSz = 1024;

/// Default [`ChunkSz`] for reading files, 32 KiB.
pub const CHUNKSZ_DEFAULT: ChunkSz = 32 * KIB;
/// Smallest allowed [`ChunkSz`].
pub const CHUNKSZ_MIN: ChunkSz = 1;
/// Largest allowed [`ChunkSz`], 64 MiB.
pub const CHUNKSZ_MAX: ChunkSz = 64 * KIB * KIB;

/// Default capacity of the [`ReactiveQueue`] between the file reading thread
/// and the line processing thread.
///
/// [`ReactiveQueue`]: crate::readers::reactivequeue::ReactiveQueue
pub const QUEUE_CAPACITY_DEFAULT: usize = 8;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lines and Records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Unique identifier of a physical line, and of the [`Record`] made from it.
/// Assigned in arrival order starting at [`LINE_UID_FIRST`].
///
/// [`Record`]: crate::data::record::Record
pub type LineUid = u64;

/// The first assigned [`LineUid`].
pub const LINE_UID_FIRST: LineUid = 1;

/// The [`LineUid`] of a parent header record. `None` is the "no parent"
/// sentinel.
pub type ParentUid = Option<LineUid>;

/// Single-byte newLine char as u8
#[allow(non_upper_case_globals)]
pub const NLu8: u8 = 10;
/// Carriage Return as u8
#[allow(non_upper_case_globals)]
pub const CRu8: u8 = 13;

/// Encoding of the bytes of a file.
///
/// Files are decoded into UTF-8 by the [`StreamReader`] before any line
/// splitting occurs.
///
/// [`StreamReader`]: crate::readers::streamreader::StreamReader
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum FileEncoding {
    /// UTF-8 (or ASCII). Bytes are passed along as-is.
    #[default]
    Utf8,
    /// UTF-16. A byte order mark selects the endianness; without a BOM
    /// little-endian is presumed.
    Utf16,
}

impl fmt::Display for FileEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileEncoding::Utf8 => write!(f, "UTF-8"),
            FileEncoding::Utf16 => write!(f, "UTF-16"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// custom Results enums for various *Reader functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `Result` Extended
/// for chunk reading functions
#[derive(Debug, PartialEq)]
pub enum ResultS3<T, E> {
    /// Contains the success data
    Found(T),
    /// File is empty, or other condition that means "Done", nothing to return, but no bad errors happened
    Done,
    /// Contains the error value, something bad happened
    Err(E),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// allocator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The global allocator chosen at compile-time by feature `jemalloc` or
/// `mimalloc`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AllocatorChosen {
    #[default]
    System,
    Jemalloc,
    Mimalloc,
}

impl fmt::Display for AllocatorChosen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AllocatorChosen::System => write!(f, "system"),
            AllocatorChosen::Jemalloc => write!(f, "jemalloc"),
            AllocatorChosen::Mimalloc => write!(f, "mimalloc"),
        }
    }
}
