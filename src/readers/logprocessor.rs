// src/readers/logprocessor.rs

//! Implements a [`LogProcessor`], the driver of processing one log file.
//!
//! A `LogProcessor` wires together
//!
//! 1. a [`StreamReader`] reading chunks of the file on its own thread,
//! 2. a [`ReactiveQueue`] of those chunks, and on the queue's consumer thread
//! 3. a [`RecordReader`] making [`Record`]s and passing them to the attached
//!    [`RecordObserver`]s.
//!
//! ```text
//! file ─▶ StreamReader ─▶ ReactiveQueue ─▶ RecordReader ─▶ RecordObserver…
//!         (thread)           (bounded)      (consumer thread)
//! ```
//!
//! The `StreamReader` pushes chunks into the queue with a timeout and
//! re-checks for cancellation between attempts, so [`stop`] takes effect even
//! if an observer stalls the consumer thread. The end-of-stream marker is
//! always queued once reading ends, stopped or not.
//!
//! [`StreamReader`]: crate::readers::streamreader::StreamReader
//! [`ReactiveQueue`]: crate::readers::reactivequeue::ReactiveQueue
//! [`RecordReader`]: crate::readers::recordreader::RecordReader
//! [`RecordObserver`]: crate::readers::recordreader::RecordObserver
//! [`Record`]: crate::data::record::Record
//! [`stop`]: LogProcessor::stop

use crate::common::{
    Bytes,
    ChunkSz,
    FPath,
    FileEncoding,
    CHUNKSZ_DEFAULT,
    QUEUE_CAPACITY_DEFAULT,
};
use crate::data::pattern::LinePatternP;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::readers::reactivequeue::{PushError, ReactiveQueue};
use crate::readers::recordreader::{ObserverList, ObserverListP, ObserverP, RecordReader};
use crate::readers::streamreader::{StreamControlP, StreamObserver, StreamReader};
use crate::readers::summary::Summary;

use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Longest the reading thread waits on a full queue before re-checking for
/// cancellation.
pub const PUSH_WAIT: Duration = Duration::from_millis(100);

/// Name of the queue's consumer thread.
pub const CONSUMER_THREAD_NAME: &str = "logprocessor-records";

/// An item of the [`ReactiveQueue`] between the reading thread and the
/// consumer thread.
///
/// [`ReactiveQueue`]: crate::readers::reactivequeue::ReactiveQueue
#[derive(Debug, Eq, PartialEq)]
pub enum StreamDatum {
    /// UTF-8 bytes in stream order. Not aligned to lines.
    Chunk(Bytes),
    /// No more chunks follow.
    Eof,
}

/// Configuration of a [`LogProcessor`].
#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub path: FPath,
    /// Bytes read from the file per chunk.
    pub chunksz: ChunkSz,
    pub encoding: FileEncoding,
    pub pattern: LinePatternP,
    /// Most chunks held between the reading thread and the consumer thread.
    pub queue_capacity: usize,
}

impl StreamConfig {
    /// Configuration with default chunk size, encoding, and queue capacity.
    pub fn new(
        path: FPath,
        pattern: LinePatternP,
    ) -> StreamConfig {
        StreamConfig {
            path,
            chunksz: CHUNKSZ_DEFAULT,
            encoding: FileEncoding::default(),
            pattern,
            queue_capacity: QUEUE_CAPACITY_DEFAULT,
        }
    }

    pub fn with_chunksz(
        mut self,
        chunksz: ChunkSz,
    ) -> StreamConfig {
        self.chunksz = chunksz;

        self
    }

    pub fn with_encoding(
        mut self,
        encoding: FileEncoding,
    ) -> StreamConfig {
        self.encoding = encoding;

        self
    }

    pub fn with_queue_capacity(
        mut self,
        queue_capacity: usize,
    ) -> StreamConfig {
        self.queue_capacity = queue_capacity;

        self
    }
}

/// Stages of a [`LogProcessor`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessingStage {
    /// File is opened, the reading thread is not started.
    Stage0Opened,
    /// The reading thread is started.
    Stage1Streaming,
    /// Every chunk is consumed and every observer has seen `on_eof`.
    Stage2Finished,
}

/// Pushes chunks from the reading thread into the queue.
struct QueueFeeder {
    queue: Arc<ReactiveQueue<StreamDatum>>,
    control: StreamControlP,
}

impl QueueFeeder {
    /// Push `datum`, waiting for space. Returns `false` if the queue is
    /// stopped or reading was cancelled while the queue was full.
    fn push(
        &self,
        datum: StreamDatum,
    ) -> bool {
        let mut datum = datum;
        loop {
            match self.queue.push_timeout(datum, PUSH_WAIT) {
                Ok(()) => return true,
                Err(PushError::Stopped(_)) => {
                    de_wrn!("queue stopped before the reading thread ended");
                    return false;
                }
                Err(PushError::Timeout(d)) => {
                    if self.control.is_cancelled() {
                        defo!("cancelled while the queue is full");
                        return false;
                    }
                    datum = d;
                }
            }
        }
    }
}

impl StreamObserver for QueueFeeder {
    fn on_data(
        &mut self,
        chunk: Bytes,
    ) -> bool {
        self.push(StreamDatum::Chunk(chunk))
    }

    /// `Eof` is pushed even after cancellation, waiting for space as long as
    /// the consumer thread runs, so observers see `on_eof` without [`wait`].
    ///
    /// [`wait`]: LogProcessor::wait
    fn on_eof(&mut self) {
        if self.queue.push(StreamDatum::Eof).is_err() {
            de_wrn!("queue stopped before Eof was pushed");
        }
    }

    fn on_read_percentage(
        &mut self,
        _percent: u8,
    ) {
        defo!("read {}%", _percent);
    }
}

/// Lock the shared `RecordReader`. An observer panic is caught within
/// `RecordReader` so the lock is not poisoned by one.
fn lock_reader(record_reader: &Mutex<RecordReader>) -> MutexGuard<'_, RecordReader> {
    record_reader
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// The driver of processing one log file. See the [module documentation].
///
/// [module documentation]: self
pub struct LogProcessor {
    path: FPath,
    stage: ProcessingStage,
    /// Declared before `queue`; dropping it joins the reading thread which
    /// holds a pointer to `queue`.
    reader: StreamReader,
    queue: Arc<ReactiveQueue<StreamDatum>>,
    record_reader: Arc<Mutex<RecordReader>>,
    observers: ObserverListP,
    summary: Option<Summary>,
}

impl fmt::Debug for LogProcessor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LogProcessor")
            .field("path", &self.path)
            .field("stage", &self.stage)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl LogProcessor {
    /// Open the file and create the queue. The file is not read until
    /// [`start`].
    ///
    /// Fails with `ErrorKind::InvalidInput` for a bad configuration, or with
    /// the error of opening the file, e.g. `ErrorKind::NotFound`. The file is
    /// opened before any thread is started.
    ///
    /// [`start`]: LogProcessor::start
    pub fn new(config: StreamConfig) -> Result<LogProcessor> {
        defn!("({:?})", config.path);
        if config.queue_capacity == 0 {
            defx!("queue_capacity 0");
            return Err(Error::new(ErrorKind::InvalidInput, "queue capacity must be at least 1"));
        }
        let reader = StreamReader::new(config.path.clone(), config.chunksz, config.encoding)?;
        let observers: ObserverListP = ObserverListP::new(ObserverList::new());
        let record_reader = Arc::new(Mutex::new(RecordReader::new(config.pattern, observers.clone())));
        let queue: ReactiveQueue<StreamDatum> =
            ReactiveQueue::with_name(config.queue_capacity, CONSUMER_THREAD_NAME)?;
        let record_reader_cb = record_reader.clone();
        queue.register_callback(move |datum: StreamDatum| match datum {
            StreamDatum::Chunk(chunk) => lock_reader(&record_reader_cb).process_chunk(&chunk),
            StreamDatum::Eof => lock_reader(&record_reader_cb).finish(),
        });
        defx!();

        Ok(LogProcessor {
            path: config.path,
            stage: ProcessingStage::Stage0Opened,
            reader,
            queue: Arc::new(queue),
            record_reader,
            observers,
            summary: None,
        })
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    pub fn stage(&self) -> ProcessingStage {
        self.stage
    }

    /// Attach `observer`. Returns `false` if it is already attached.
    /// May be called while processing.
    pub fn attach(
        &self,
        observer: ObserverP,
    ) -> bool {
        self.observers.attach(observer)
    }

    /// Detach `observer`. Returns `false` if it was not attached.
    /// May be called while processing.
    pub fn detach(
        &self,
        observer: &ObserverP,
    ) -> bool {
        self.observers.detach(observer)
    }

    /// Start the reading thread.
    /// Fails with `ErrorKind::InvalidInput` if already started.
    pub fn start(&mut self) -> Result<()> {
        defn!();
        if self.stage != ProcessingStage::Stage0Opened {
            defx!("stage {:?}", self.stage);
            return Err(Error::new(ErrorKind::InvalidInput, "LogProcessor already started"));
        }
        let feeder = QueueFeeder {
            queue: self.queue.clone(),
            control: self.reader.control().clone(),
        };
        self.reader.start(Box::new(feeder))?;
        self.stage = ProcessingStage::Stage1Streaming;
        defx!();

        Ok(())
    }

    /// Pause reading at the next chunk boundary. Chunks already queued are
    /// still consumed. Returns `false` if already paused.
    pub fn pause(&self) -> bool {
        self.reader.pause()
    }

    /// Returns `false` if not paused.
    pub fn resume(&self) -> bool {
        self.reader.resume()
    }

    pub fn is_paused(&self) -> bool {
        self.reader.is_paused()
    }

    /// Stop reading at the next chunk boundary. Chunks already queued are
    /// still consumed by [`wait`].
    ///
    /// [`wait`]: LogProcessor::wait
    pub fn stop(&self) {
        defñ!();
        self.reader.stop()
    }

    /// Percent of the file read.
    pub fn progress(&self) -> u8 {
        self.reader.progress()
    }

    /// The reading thread has ended and every queued chunk is consumed.
    pub fn is_drained(&self) -> bool {
        self.reader.is_finished() && self.queue.is_empty()
    }

    /// Wait for reading to end and for every queued chunk to be consumed,
    /// then return the [`Summary`].
    ///
    /// Observers have seen `on_eof` when this returns. A `LogProcessor` that
    /// was never started reads nothing.
    pub fn wait(&mut self) -> Summary {
        defn!();
        if let Some(summary) = self.summary.as_ref() {
            defx!("already finished");
            return summary.clone();
        }
        let summary_stream = self.reader.join();
        self.queue.drain_and_stop();
        let summary_records = {
            let mut record_reader = lock_reader(&self.record_reader);
            // `Eof` is not queued if reading never started
            record_reader.finish();
            record_reader.summary()
        };
        let summary = Summary::new(
            self.path.clone(),
            summary_stream,
            self.queue.summary(),
            summary_records,
        );
        self.stage = ProcessingStage::Stage2Finished;
        self.summary = Some(summary.clone());
        defx!();

        summary
    }
}
