// src/debug/helpers.rs

//! Miscellaneous helper functions for testing.

use crate::common::FPath;

#[allow(unused_imports)] // XXX: clippy wrongly marks this as unused
use std::io::Write; // for `NamedTempFile.write_all`

use ::lazy_static::lazy_static;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

#[doc(hidden)]
pub use ::tempfile::NamedTempFile;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// NamedTempFile instances default to this file name prefix.
/// A known prefix eases cleanup of temporary files left by aborted tests.
/// See <https://github.com/Stebalien/tempfile/issues/183>.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-loghead-test-";

lazy_static! {
    pub static ref STRING_TEMPFILE_PREFIX: String = String::from(STR_TEMPFILE_PREFIX);
    // there is no `String::default` so create this just once
    static ref STRING_TEMPFILE_SUFFIX: String = String::from("");
}

/// Small helper function for copying `NamedTempFile` path to a `FPath`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    FPath::from(ntf.path().to_str().unwrap())
}

/// Testing helper function to write a `[u8]` to a specially-named
/// temporary file.
pub fn create_temp_file_with_name(
    data: &[u8],
    prefix: Option<&String>,
    suffix: Option<&String>,
) -> NamedTempFile {
    defñ!("(data len {}, {:?}, {:?})", data.len(), prefix, suffix);
    let mut ntf = match ::tempfile::Builder::new()
        .prefix::<str>(
            prefix
                .unwrap_or(&STRING_TEMPFILE_PREFIX)
                .as_ref(),
        )
        .suffix::<str>(
            suffix
                .unwrap_or(&STRING_TEMPFILE_SUFFIX)
                .as_ref(),
        )
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("tempfile::Builder::new()..tempfile() return Err {}", err);
        }
    };
    match ntf.write_all(data) {
        Ok(_) => {}
        Err(err) => {
            panic!("NamedTempFile::write_all() return Err {}", err);
        }
    }

    ntf
}

/// Testing helper function to write a `str` to a temporary file.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    create_temp_file_with_name(data.as_bytes(), None, None)
}

/// Testing helper function to write a `[u8]` to a temporary file.
pub fn create_temp_file_bytes(data: &[u8]) -> NamedTempFile {
    create_temp_file_with_name(data, None, None)
}

/// Testing helper function to write a `str` to a temporary file with a specific
/// suffix
pub fn create_temp_file_with_suffix(
    data: &str,
    suffix: &String,
) -> NamedTempFile {
    create_temp_file_with_name(data.as_bytes(), None, Some(suffix))
}

/// Testing helper function to write a `str` as UTF-16LE, with a byte order
/// mark, to a temporary file.
pub fn create_temp_file_utf16le(data: &str) -> NamedTempFile {
    let mut bytes: Vec<u8> = Vec::with_capacity(data.len() * 2 + 2);
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    for unit in data.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    create_temp_file_bytes(&bytes)
}

/// Testing helper function to write a `str` as UTF-16BE, with a byte order
/// mark, to a temporary file.
pub fn create_temp_file_utf16be(data: &str) -> NamedTempFile {
    let mut bytes: Vec<u8> = Vec::with_capacity(data.len() * 2 + 2);
    bytes.extend_from_slice(&[0xFE, 0xFF]);
    for unit in data.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }

    create_temp_file_bytes(&bytes)
}
