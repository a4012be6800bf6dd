// src/lib.rs

//! _lhlib_ streams a log file into structured, typed records.
//!
//! Lines matching a header template start a record. Other lines, e.g. the
//! lines of a stack trace, are stitched to the record before them.
//!
//! A header template is literal text with `{}` placeholders, one per
//! [`Field`], compiled to a [`LinePattern`]. A [`LogProcessor`] reads the file
//! on one thread and makes [`Record`]s on another, passing each `Record` to
//! the attached [`RecordObserver`]s.
//!
//! The binary program _loghead_ uses a `LogProcessor` to print the records
//! of one file.
//!
//! [`Field`]: crate::data::field::Field
//! [`LinePattern`]: crate::data::pattern::LinePattern
//! [`LogProcessor`]: crate::readers::logprocessor::LogProcessor
//! [`Record`]: crate::data::record::Record
//! [`RecordObserver`]: crate::readers::recordreader::RecordObserver

pub mod common;
pub mod data;
pub mod debug;
pub mod observers;
pub mod readers;

#[cfg(test)]
pub mod tests;
