// src/readers/mod.rs

//! "Readers" for _lhlib_.
//!
//! ## Overview of readers
//!
//! * A [`LogProcessor`] drives a [`StreamReader`] and a [`RecordReader`]
//!   joined by a [`ReactiveQueue`].
//! * A `StreamReader` reads chunks of bytes from a file on its own thread.
//! * A `ReactiveQueue` holds chunks until its consumer thread passes them to
//!   the `RecordReader`.
//! * A `RecordReader` drives a [`LineAssembler`] to derive [`Line`]s, and
//!   classifies each `Line` as a [`Record`].
//!
//! <br/>
//!
//! * A `StreamReader` only handles `u8` bytes. A UTF-16 file is decoded to
//!   UTF-8 bytes.
//! * A `LineAssembler` converts the bytes of each line to a `String`.
//!
//! <br/>
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`Record`]: crate::data::record::Record
//! [`Line`]: crate::readers::linereader::Line
//! [`LineAssembler`]: crate::readers::linereader::LineAssembler
//! [`LogProcessor`]: crate::readers::logprocessor::LogProcessor
//! [`ReactiveQueue`]: crate::readers::reactivequeue::ReactiveQueue
//! [`RecordReader`]: crate::readers::recordreader::RecordReader
//! [`StreamReader`]: crate::readers::streamreader::StreamReader

pub mod linereader;
pub mod logprocessor;
pub mod reactivequeue;
pub mod recordreader;
pub mod streamreader;
pub mod summary;
