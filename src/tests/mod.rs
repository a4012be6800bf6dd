// src/tests/mod.rs

//! Tests for _lhlib_.
//!
//! Tests are placed at `src/tests/`, inside the `lhlib`. This is a reasonable
//! trade-off of separation and access.
//!
//! Tests placed at top-level path `tests/` do not have crate-internal
//! visibility. While it is recommended to not require internal visibility for
//! testing, in practice that often makes tests difficult or impossible to
//! implement.

pub mod common;
pub mod helpers_tests;
pub mod pattern_tests;
pub mod printers_tests;
pub mod record_tests;
pub mod recordreader_tests;
