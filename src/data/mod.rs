// src/data/mod.rs

//! The `data` module is specialized data containers for
//! [`Field`]s, [`LinePattern`]s, and [`Record`]s.
//!
//! ## Definitions of data
//!
//! A "line" is a sequence of bytes ending with a newline (`'\n'`), or the
//! last bytes of a file. A trailing carriage return (`'\r'`) is not part of
//! the line.
//!
//! A "field" is one typed token of a line's header, e.g. a date or a severity
//! level. A [`Field`] knows the regular expression fragment that finds it.
//!
//! A "line pattern" is a template of literal text and `{}` placeholders with
//! one `Field` per placeholder, compiled to one regular expression.
//!
//! A "record" is made from each line. A line matching the line pattern
//! becomes a _header_ record ([`RecordKind::HeaderAndMessage`]) holding the
//! captured `Field`s. A line not matching becomes a _continuation_ record
//! ([`RecordKind::MessagePart`]) linked to the most recent header record,
//! e.g. one line of a stack trace.
//!
//! [`Field`]: crate::data::field::Field
//! [`LinePattern`]: crate::data::pattern::LinePattern
//! [`Record`]: crate::data::record::Record
//! [`RecordKind::HeaderAndMessage`]: crate::data::record::RecordKind::HeaderAndMessage
//! [`RecordKind::MessagePart`]: crate::data::record::RecordKind::MessagePart

pub mod field;
pub mod pattern;
pub mod record;
