// src/readers/streamreader.rs

//! Implements a [`StreamReader`], reads a file in chunks on its own thread
//! and passes each chunk to a [`StreamObserver`].
//!
//! The reading thread may be paused, resumed, and stopped from any thread
//! through the shared [`StreamControl`]. Each of these acts between chunks.
//!
//! A UTF-16 file is decoded to UTF-8 before chunks are passed on, so a
//! `StreamObserver` only sees UTF-8 bytes. A decoded chunk never ends within
//! a UTF-16 surrogate pair; the decoder holds incomplete code units until the
//! next chunk.

use crate::common::{
    Bytes,
    ChunkSz,
    Count,
    FPath,
    File,
    FileEncoding,
    FileSz,
    ResultS3,
    CHUNKSZ_MAX,
    CHUNKSZ_MIN,
};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::fmt;
use std::io::{Error, ErrorKind, Read, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use ::encoding_rs::{CoderResult, Decoder, UTF_16LE};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Longest a paused reading thread sleeps before re-checking for
/// cancellation.
pub const PAUSE_WAIT: Duration = Duration::from_millis(300);

/// Name of the reading thread.
pub const READER_THREAD_NAME: &str = "streamreader";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StreamObserver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Receives chunks and events from a [`StreamReader`]. Every method is
/// called on the reading thread.
pub trait StreamObserver: Send {
    /// A chunk of UTF-8 bytes, in stream order. Never empty.
    /// Return `false` to stop reading.
    fn on_data(
        &mut self,
        chunk: Bytes,
    ) -> bool;

    fn on_paused(&mut self) {}

    fn on_resumed(&mut self) {}

    /// Reading stopped before the end of the file.
    fn on_stopped(&mut self) {}

    /// Called last, once, whether or not the end of the file was reached.
    fn on_eof(&mut self) {}

    /// Percent of the file read, called when it changes.
    fn on_read_percentage(
        &mut self,
        _percent: u8,
    ) {
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StreamControl
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pause, resume, and cancellation of a reading thread, and its progress.
#[derive(Debug)]
pub struct StreamControl {
    paused: Mutex<bool>,
    cond_resume: Condvar,
    cancelled: AtomicBool,
    /// File bytes read so far.
    bytes_read: AtomicU64,
    filesz: FileSz,
}

pub type StreamControlP = Arc<StreamControl>;

impl StreamControl {
    pub fn new(filesz: FileSz) -> StreamControl {
        StreamControl {
            paused: Mutex::new(false),
            cond_resume: Condvar::new(),
            cancelled: AtomicBool::new(false),
            bytes_read: AtomicU64::new(0),
            filesz,
        }
    }

    /// Pause reading at the next chunk boundary. Returns `false` if already
    /// paused.
    pub fn pause(&self) -> bool {
        let mut paused = self
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let changed: bool = !*paused;
        *paused = true;

        changed
    }

    /// Returns `false` if not paused.
    pub fn resume(&self) -> bool {
        let changed: bool = {
            let mut paused = self
                .paused
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let changed: bool = *paused;
            *paused = false;
            changed
        };
        self.cond_resume.notify_all();

        changed
    }

    pub fn is_paused(&self) -> bool {
        *self
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop reading at the next chunk boundary, including while paused.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.cond_resume.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn bytes_read(&self) -> Count {
        self.bytes_read.load(Ordering::Relaxed)
    }

    pub fn filesz(&self) -> FileSz {
        self.filesz
    }

    /// Percent of the file read. An empty file is 100 percent read.
    pub fn percentage(&self) -> u8 {
        if self.filesz == 0 {
            return 100;
        }
        let percent: u64 = self.bytes_read().saturating_mul(100) / self.filesz;

        percent.min(100) as u8
    }

    fn add_bytes_read(
        &self,
        count: Count,
    ) {
        self.bytes_read.fetch_add(count, Ordering::Relaxed);
    }

    /// Block while paused. Returns `false` if cancelled.
    fn wait_while_paused(&self) -> bool {
        let mut paused = self
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *paused {
            if self.is_cancelled() {
                return false;
            }
            paused = self
                .cond_resume
                .wait_timeout(paused, PAUSE_WAIT)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        !self.is_cancelled()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StreamReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Statistics of a [`StreamReader`], for CLI option `--summary`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryStreamReader {
    pub path: FPath,
    pub filesz: FileSz,
    pub encoding: FileEncoding,
    pub chunksz: ChunkSz,
    /// Chunks read from the file.
    pub chunks: Count,
    /// Bytes read from the file.
    pub bytes_read: Count,
    /// UTF-8 bytes passed to the `StreamObserver`.
    pub bytes_passed: Count,
    /// Times the reader was paused.
    pub pauses: Count,
    /// Reading stopped before the end of the file.
    pub stopped: bool,
    /// The end of the file was reached.
    pub eof: bool,
    /// The read error that ended reading, if any.
    pub error: Option<String>,
}

/// Reads a file in chunks of `chunksz` bytes on a dedicated thread.
/// See the [module documentation].
///
/// [module documentation]: self
pub struct StreamReader {
    path: FPath,
    chunksz: ChunkSz,
    encoding: FileEncoding,
    /// `Some` until `start`.
    file: Option<File>,
    control: StreamControlP,
    handle: Option<thread::JoinHandle<SummaryStreamReader>>,
}

impl fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StreamReader")
            .field("path", &self.path)
            .field("chunksz", &self.chunksz)
            .field("encoding", &self.encoding)
            .field("started", &self.file.is_none())
            .finish()
    }
}

impl StreamReader {
    /// Open the file at `path`. No thread is started.
    ///
    /// Fails with the error of opening the file, e.g. `ErrorKind::NotFound`,
    /// or `ErrorKind::InvalidInput` if `chunksz` is out of bounds or `path`
    /// is a directory.
    pub fn new(
        path: FPath,
        chunksz: ChunkSz,
        encoding: FileEncoding,
    ) -> Result<StreamReader> {
        defn!("({:?}, {}, {})", path, chunksz, encoding);
        if !(CHUNKSZ_MIN..=CHUNKSZ_MAX).contains(&chunksz) {
            defx!("bad chunksz {}", chunksz);
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("chunk size {} must be {} to {}", chunksz, CHUNKSZ_MIN, CHUNKSZ_MAX),
            ));
        }
        let file: File = File::open(path.as_str())?;
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            defx!("{:?} is a directory", path);
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("path {:?} is a directory", path),
            ));
        }
        let filesz: FileSz = metadata.len();
        defx!("filesz {}", filesz);

        Ok(StreamReader {
            path,
            chunksz,
            encoding,
            file: Some(file),
            control: StreamControlP::new(StreamControl::new(filesz)),
            handle: None,
        })
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    pub fn control(&self) -> &StreamControlP {
        &self.control
    }

    /// Start the reading thread, passing chunks to `observer`.
    /// Fails with `ErrorKind::InvalidInput` if already started.
    pub fn start(
        &mut self,
        observer: Box<dyn StreamObserver>,
    ) -> Result<()> {
        defn!();
        let file: File = match self.file.take() {
            Some(file) => file,
            None => {
                defx!("already started");
                return Err(Error::new(ErrorKind::InvalidInput, "StreamReader already started"));
            }
        };
        let summary = SummaryStreamReader {
            path: self.path.clone(),
            filesz: self.control.filesz(),
            encoding: self.encoding,
            chunksz: self.chunksz,
            ..Default::default()
        };
        let control = self.control.clone();
        let chunksz = self.chunksz;
        let encoding = self.encoding;
        let handle = thread::Builder::new()
            .name(String::from(READER_THREAD_NAME))
            .spawn(move || read_loop(file, chunksz, encoding, control, observer, summary))?;
        self.handle = Some(handle);
        defx!();

        Ok(())
    }

    pub fn pause(&self) -> bool {
        self.control.pause()
    }

    pub fn resume(&self) -> bool {
        self.control.resume()
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    pub fn stop(&self) {
        self.control.cancel()
    }

    /// Percent of the file read.
    pub fn progress(&self) -> u8 {
        self.control.percentage()
    }

    pub fn is_started(&self) -> bool {
        self.file.is_none()
    }

    /// The reading thread was started and has ended.
    pub fn is_finished(&self) -> bool {
        match self.handle.as_ref() {
            Some(handle) => handle.is_finished(),
            None => self.is_started(),
        }
    }

    /// Wait for the reading thread to end.
    pub fn join(&mut self) -> SummaryStreamReader {
        defn!();
        let summary = match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(summary) => summary,
                Err(_) => {
                    e_err!("StreamReader thread panicked for {:?}", self.path);
                    SummaryStreamReader {
                        path: self.path.clone(),
                        error: Some(String::from("reading thread panicked")),
                        ..Default::default()
                    }
                }
            },
            None => SummaryStreamReader {
                path: self.path.clone(),
                filesz: self.control.filesz(),
                encoding: self.encoding,
                chunksz: self.chunksz,
                ..Default::default()
            },
        };
        defx!("{:?}", summary);

        summary
    }
}

impl Drop for StreamReader {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.control.cancel();
            if handle.join().is_err() {
                de_err!("StreamReader thread panicked for {:?}", self.path);
            }
        }
    }
}

/// Read the next chunk of up to `chunksz` bytes into `buffer`.
fn read_chunk(
    file: &File,
    chunksz: ChunkSz,
    buffer: &mut Bytes,
) -> ResultS3<usize, Error> {
    buffer.clear();
    let mut reader = file.take(chunksz as u64);
    match reader.read_to_end(buffer) {
        Ok(0) => ResultS3::Done,
        Ok(count) => ResultS3::Found(count),
        Err(err) => ResultS3::Err(err),
    }
}

/// Decode UTF-16 `src` into UTF-8 bytes. Incomplete code units are held by
/// `decoder` until the next call, or until `last`.
fn decode_utf16(
    decoder: &mut Decoder,
    src: &[u8],
    last: bool,
) -> Bytes {
    let capacity: usize = decoder
        .max_utf8_buffer_length(src.len())
        .unwrap_or(src.len() * 3 + 4);
    let mut out = String::with_capacity(capacity);
    let mut consumed: usize = 0;
    loop {
        let (result, read, _had_errors) = decoder.decode_to_string(&src[consumed..], &mut out, last);
        consumed += read;
        match result {
            CoderResult::InputEmpty => break,
            CoderResult::OutputFull => out.reserve(src.len() - consumed + 16),
        }
    }

    out.into_bytes()
}

/// The reading thread.
fn read_loop(
    file: File,
    chunksz: ChunkSz,
    encoding: FileEncoding,
    control: StreamControlP,
    mut observer: Box<dyn StreamObserver>,
    mut summary: SummaryStreamReader,
) -> SummaryStreamReader {
    defn!("({:?})", summary.path);
    let mut buffer = Bytes::with_capacity(chunksz);
    // BOM sniffing picks big-endian when the file starts with `FE FF`
    let mut decoder: Option<Decoder> = match encoding {
        FileEncoding::Utf8 => None,
        FileEncoding::Utf16 => Some(UTF_16LE.new_decoder()),
    };
    let mut percent_last: Option<u8> = None;
    let mut stopped: bool = false;

    loop {
        if control.is_cancelled() {
            stopped = true;
            break;
        }
        if control.is_paused() {
            defo!("paused");
            summary.pauses += 1;
            observer.on_paused();
            if !control.wait_while_paused() {
                stopped = true;
                break;
            }
            defo!("resumed");
            observer.on_resumed();
        }
        match read_chunk(&file, chunksz, &mut buffer) {
            ResultS3::Found(count) => {
                summary.chunks += 1;
                summary.bytes_read += count as Count;
                control.add_bytes_read(count as Count);
                let chunk: Bytes = match decoder.as_mut() {
                    None => buffer.clone(),
                    Some(decoder) => decode_utf16(decoder, &buffer, false),
                };
                if !chunk.is_empty() {
                    summary.bytes_passed += chunk.len() as Count;
                    if !observer.on_data(chunk) {
                        defo!("observer declined more data");
                        stopped = true;
                        break;
                    }
                }
                let percent: u8 = control.percentage();
                if percent_last != Some(percent) {
                    percent_last = Some(percent);
                    observer.on_read_percentage(percent);
                }
            }
            ResultS3::Done => {
                summary.eof = true;
                break;
            }
            ResultS3::Err(err) => {
                e_err!("read failed for {:?}: {}", summary.path, err);
                summary.error = Some(err.to_string());
                break;
            }
        }
    }

    if let Some(decoder) = decoder.as_mut() {
        let tail: Bytes = decode_utf16(decoder, &[], true);
        if !tail.is_empty() && !stopped {
            summary.bytes_passed += tail.len() as Count;
            observer.on_data(tail);
        }
    }
    if stopped {
        summary.stopped = true;
        observer.on_stopped();
    }
    observer.on_eof();
    defx!("chunks {}, bytes_read {}", summary.chunks, summary.bytes_read);

    summary
}
