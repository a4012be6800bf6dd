// src/bin/loghead.rs
//
// ‥ … ≤ ≥ ≠ ≟ ×

//! Driver program _loghead_ drives the [_lhlib_].
//!
//! Processes user-passed command-line arguments into a [`LinePattern`] and a
//! [`StreamConfig`]. Then a [`LogProcessor`] processes the one passed file.
//!
//! The `LogProcessor` passes each [`Record`] to a [`ChannelObserver`] on its
//! consumer thread. The main thread receives each `Record` from the channel
//! and prints it, colored by the level of its header record.
//!
//! If passed CLI option `--summary`, the main thread prints a [`Summary`]
//! after the file is processed. If passed CLI option `--levels`, the main
//! thread prints the count of records per level gathered by a
//! [`LevelMonitor`].
//!
//! A Ctrl-C stops reading the file. Records already read are still printed,
//! as is the summary.
//!
//! `loghead.rs` should be the main thread and the only thread that prints to
//! STDOUT.
//!
//! [_lhlib_]: lhlib
//! [`LinePattern`]: lhlib::data::pattern::LinePattern
//! [`StreamConfig`]: lhlib::readers::logprocessor::StreamConfig
//! [`LogProcessor`]: lhlib::readers::logprocessor::LogProcessor
//! [`Record`]: lhlib::data::record::Record
//! [`ChannelObserver`]: lhlib::observers::adapters::ChannelObserver
//! [`Summary`]: lhlib::readers::summary::Summary
//! [`LevelMonitor`]: lhlib::observers::levelmonitor::LevelMonitor

#![allow(non_camel_case_types)]

// first setup the custom global allocator
use ::lhlib::common::AllocatorChosen;

cfg_if::cfg_if! {
    if #[cfg(feature = "jemalloc")] {
        use ::tikv_jemallocator::Jemalloc;
        #[global_allocator]
        static GLOBAL: Jemalloc = Jemalloc;
        const ALLOCATOR_CHOSEN: AllocatorChosen = AllocatorChosen::Jemalloc;
        const CLI_HELP_AFTER_ALLOCATOR: &str = "jemalloc";
    }
    else if #[cfg(feature = "mimalloc")] {
        use ::mimalloc::MiMalloc;
        #[global_allocator]
        static GLOBAL: MiMalloc = MiMalloc;
        const ALLOCATOR_CHOSEN: AllocatorChosen = AllocatorChosen::Mimalloc;
        const CLI_HELP_AFTER_ALLOCATOR: &str = "mimalloc";
    }
    else {
        const ALLOCATOR_CHOSEN: AllocatorChosen = AllocatorChosen::System;
        const CLI_HELP_AFTER_ALLOCATOR: &str = "system";
    }
}

use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
use ::crossbeam_channel::RecvTimeoutError;
use ::itertools::Itertools;
use ::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use ::lhlib::common::{ChunkSz, FPath, FileEncoding, CHUNKSZ_DEFAULT, CHUNKSZ_MAX, CHUNKSZ_MIN, QUEUE_CAPACITY_DEFAULT};
use ::lhlib::data::field::{Field, LogLevel};
use ::lhlib::data::pattern::{LinePattern, LinePatternP};
use ::lhlib::data::record::RecordP;
#[allow(unused_imports)]
use ::lhlib::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use ::lhlib::observers::adapters::{ChanRecvRecord, ChannelObserver, RecordMessage};
use ::lhlib::observers::levelmonitor::LevelMonitor;
use ::lhlib::readers::logprocessor::{LogProcessor, StreamConfig};
use ::lhlib::readers::recordreader::ObserverP;
use ::lhlib::readers::summary::Summary;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, stack::stack_offset_set};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

/// CLI enum that maps to [`FileEncoding`].
///
/// [`FileEncoding`]: lhlib::common::FileEncoding
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    ValueEnum, // from `clap`
)]
enum CLI_Encoding {
    utf8,
    utf16,
}

const CLI_HELP_AFTER: &str = "\
Each --field is paired, in order, with a \"{}\" placeholder of the --pattern.
A line matching the pattern begins a record. Other lines continue the record
before them.

Fields:
    date[:ymd|dmy]                      2023-07-19 or 19-07-2023
    time[:none|ms|us|ns[:DIGITS[:SEP]]] 12:55:48 or 12:55:48.691
    level[:NAME=LEVEL,...]              debug, or a custom name per level
    logger  thread  pid  file  function  line  message

Levels are unknown, trace, debug, info, warn, error, critical.

For example, for log line
    [2023-07-19 12:55:48.691] [Main] [debug] Hello World

    loghead -p \"[{} {}] [{}] [{}] {}\" \\
        -f date -f time:ms -f logger -f level -f message ./app.log";

// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "loghead",
    // write expanded information for the `--version` output
    version = concatcp!(
        "\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "Allocator: ", CLI_HELP_AFTER_ALLOCATOR , "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
        "Author: ", env!("CARGO_PKG_AUTHORS"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path of the log file.
    #[clap(required = true, verbatim_doc_comment)]
    path: String,

    /// Header line template. Each "{}" is a placeholder for one --field.
    #[clap(short = 'p', long, required = true, verbatim_doc_comment)]
    pattern: String,

    /// A field of the header line, in placeholder order. Repeat per
    /// placeholder.
    #[clap(
        short = 'f',
        long = "field",
        required = true,
        verbatim_doc_comment,
        value_parser = cli_process_field,
    )]
    fields: Vec<Field>,

    /// Read the file in chunks of this many bytes.
    #[clap(
        short = 'c',
        long = "chunk-size",
        verbatim_doc_comment,
        default_value_t = CHUNKSZ_DEFAULT,
        value_parser = cli_process_chunksz,
    )]
    chunksz: ChunkSz,

    /// Encoding of the file. UTF-16 is little-endian unless the file begins
    /// with a big-endian byte order mark.
    #[clap(
        short = 'e',
        long,
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Encoding::utf8,
    )]
    encoding: CLI_Encoding,

    /// Most chunks held between the reading thread and the record thread.
    #[clap(
        short = 'q',
        long = "queue-capacity",
        verbatim_doc_comment,
        default_value_t = QUEUE_CAPACITY_DEFAULT,
        value_parser = cli_process_queue_capacity,
    )]
    queue_capacity: usize,

    /// Prepend each line with its uid and the uid of its header line.
    #[clap(short = 'u', long, verbatim_doc_comment)]
    uids: bool,

    /// Choose to print using colors. Header lines and their continuation
    /// lines are colored by level.
    #[clap(
        required = false,
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Print a summary of processing after the records.
    #[clap(short = 's', long, verbatim_doc_comment)]
    summary: bool,

    /// Print the count of records per level after the records.
    #[clap(short = 'l', long, verbatim_doc_comment)]
    levels: bool,
}

/// `clap` argument processor for `--field`.
fn cli_process_field(spec: &str) -> std::result::Result<Field, String> {
    spec.parse::<Field>()
        .map_err(|err| err.to_string())
}

/// `clap` argument processor for `--chunk-size`.
fn cli_process_chunksz(chunksz: &str) -> std::result::Result<ChunkSz, String> {
    let chunksz: ChunkSz = match chunksz.parse::<ChunkSz>() {
        Ok(val) => val,
        Err(err) => return Err(err.to_string()),
    };
    if !(CHUNKSZ_MIN..=CHUNKSZ_MAX).contains(&chunksz) {
        return Err(format!("must be {} to {}", CHUNKSZ_MIN, CHUNKSZ_MAX));
    }

    Ok(chunksz)
}

/// `clap` argument processor for `--queue-capacity`.
fn cli_process_queue_capacity(capacity: &str) -> std::result::Result<usize, String> {
    match capacity.parse::<usize>() {
        Ok(0) => Err(String::from("must be at least 1")),
        Ok(val) => Ok(val),
        Err(err) => Err(err.to_string()),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// signal handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// flag to signal to main thread that reading should stop.
/// Polled by function `processing_loop`.
static EXIT_EARLY: AtomicBool = AtomicBool::new(false);

/// set a process signal handler
pub fn set_signal_handler() -> anyhow::Result<(), ctrlc::Error> {
    defn!();
    ctrlc::set_handler(move || {
        defñ!("signal");
        EXIT_EARLY.store(true, Ordering::SeqCst);
    })?;
    defx!();

    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// main
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Capacity of the channel from the `ChannelObserver` to the main thread.
const CHANNEL_CAPACITY: usize = 64;

/// Longest the main thread waits on the channel before checking
/// `EXIT_EARLY`.
const RECV_WAIT: Duration = Duration::from_millis(100);

pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();
    let args = CLI_Args::parse();
    defo!("{:?}", args);

    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };
    let encoding: FileEncoding = match args.encoding {
        CLI_Encoding::utf8 => FileEncoding::Utf8,
        CLI_Encoding::utf16 => FileEncoding::Utf16,
    };
    let path: FPath = args.path.clone();

    let pattern: LinePattern = match LinePattern::new(args.pattern.as_str(), args.fields.clone()) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{}", err);
            defx!("bad pattern");
            return ExitCode::FAILURE;
        }
    };
    let config = StreamConfig::new(path.clone(), LinePatternP::new(pattern))
        .with_chunksz(args.chunksz)
        .with_encoding(encoding)
        .with_queue_capacity(args.queue_capacity);
    let mut processor = match LogProcessor::new(config) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{} for file {:?}", err, path);
            defx!("LogProcessor::new failed");
            return ExitCode::FAILURE;
        }
    };

    let (channel_observer, receiver) = ChannelObserver::bounded(CHANNEL_CAPACITY);
    let channel_observer: ObserverP = Arc::new(channel_observer);
    processor.attach(channel_observer);
    let levelmonitor = Arc::new(LevelMonitor::new());
    if args.levels {
        let observer: ObserverP = levelmonitor.clone();
        processor.attach(observer);
    }

    if let Err(err) = set_signal_handler() {
        e_wrn!("failed to set the signal handler: {}", err);
    }
    if let Err(err) = processor.start() {
        e_err!("{} for file {:?}", err, path);
        defx!("LogProcessor::start failed");
        return ExitCode::FAILURE;
    }

    let printed_ok: bool = processing_loop(&processor, &receiver, color_choice, args.uids);
    let summary: Summary = processor.wait();

    if args.levels {
        print_levels(&levelmonitor);
    }
    if args.summary {
        print_summary(&summary);
    }
    if let Some(error) = summary.error.as_ref() {
        e_err!("{} for file {:?}", error, path);
    }

    let exitcode = if printed_ok && !summary.has_error() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };
    defx!("exitcode {:?}", exitcode);

    exitcode
}

/// Color for records of `level`.
const fn color_level(level: LogLevel) -> Option<Color> {
    match level {
        LogLevel::Unknown => None,
        LogLevel::Trace => Some(Color::White),
        LogLevel::Debug => Some(Color::Cyan),
        LogLevel::Info => Some(Color::Green),
        LogLevel::Warn => Some(Color::Yellow),
        LogLevel::Error => Some(Color::Red),
        LogLevel::Critical => Some(Color::Magenta),
    }
}

/// Print one record. A continuation is colored as its header record.
fn print_record(
    stdout: &mut StandardStream,
    record: &RecordP,
    color: Option<Color>,
    uids: bool,
) -> std::io::Result<()> {
    if uids {
        match record.parent_uid() {
            Some(parent_uid) => write!(stdout, "{:>6} {:>6} ", record.uid(), parent_uid)?,
            None => write!(stdout, "{:>6} {:>6} ", record.uid(), "-")?,
        }
    }
    if color.is_some() {
        stdout.set_color(ColorSpec::new().set_fg(color))?;
    }
    stdout.write_all(record.raw_text().as_bytes())?;
    if color.is_some() {
        stdout.reset()?;
    }
    stdout.write_all(b"\n")?;

    Ok(())
}

/// Receive records from `receiver` and print them until the end of the
/// file. Returns `false` if printing failed, e.g. a closed pipe.
fn processing_loop(
    processor: &LogProcessor,
    receiver: &ChanRecvRecord,
    color_choice: ColorChoice,
    uids: bool,
) -> bool {
    defn!();
    let mut stdout = StandardStream::stdout(color_choice);
    let mut stopped: bool = false;
    let mut printing: bool = true;
    let mut color: Option<Color> = None;
    loop {
        if !stopped && EXIT_EARLY.load(Ordering::SeqCst) {
            defo!("EXIT_EARLY; stop processor");
            processor.stop();
            stopped = true;
        }
        let record: RecordP = match receiver.recv_timeout(RECV_WAIT) {
            Ok(RecordMessage::Record(record)) => record,
            Ok(RecordMessage::Eof) => break,
            Err(RecvTimeoutError::Timeout) => {
                if !processor.is_drained() {
                    continue;
                }
                // records are sent before the queue drains; take any that
                // arrived after the timeout
                match receiver.try_recv() {
                    Ok(RecordMessage::Record(record)) => record,
                    Ok(RecordMessage::Eof) => break,
                    Err(_) => {
                        de_wrn!("reading ended without Eof");
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if !printing {
            // keep receiving so the consumer thread is not blocked
            continue;
        }
        if record.is_header() {
            color = color_level(record.level().unwrap_or_default());
        } else if record.is_orphan() {
            color = None;
        }
        if let Err(err) = print_record(&mut stdout, &record, color, uids) {
            de_err!("print_record failed {}", err);
            processor.stop();
            stopped = true;
            printing = false;
        }
    }
    if printing {
        if let Err(err) = stdout.flush() {
            de_err!("stdout.flush() failed {}", err);
            printing = false;
        }
    }
    defx!("printing {}", printing);

    printing
}

fn print_levels(levelmonitor: &LevelMonitor) {
    let counts: String = levelmonitor
        .counts()
        .iter()
        .map(|(level, count)| format!("{} {}", level, count))
        .join(", ");
    println!("levels: {}", counts);
}

fn print_summary(summary: &Summary) {
    println!();
    println!("Summary:");
    println!("{}", summary);
    println!("  allocator: {}", ALLOCATOR_CHOSEN);
}
