// src/tests/helpers_tests.rs

//! tests for `src/debug/helpers.rs` functions

use crate::debug::helpers::{
    create_temp_file,
    create_temp_file_utf16be,
    create_temp_file_utf16le,
    ntf_fpath,
    STR_TEMPFILE_PREFIX,
};

use ::test_case::test_case;

#[test]
fn test_create_temp_file() {
    let ntf = create_temp_file("hello\n");
    let path = ntf_fpath(&ntf);
    let name = ntf.path().file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with(STR_TEMPFILE_PREFIX), "name {:?}", name);
    assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
}

#[test_case("", &[0xFF, 0xFE]; "empty")]
#[test_case("a\n", &[0xFF, 0xFE, b'a', 0, b'\n', 0]; "a")]
fn test_create_temp_file_utf16le(
    data: &str,
    expect: &[u8],
) {
    let ntf = create_temp_file_utf16le(data);
    assert_eq!(std::fs::read(ntf.path()).unwrap(), expect);
}

#[test_case("", &[0xFE, 0xFF]; "empty")]
#[test_case("a\n", &[0xFE, 0xFF, 0, b'a', 0, b'\n']; "a")]
fn test_create_temp_file_utf16be(
    data: &str,
    expect: &[u8],
) {
    let ntf = create_temp_file_utf16be(data);
    assert_eq!(std::fs::read(ntf.path()).unwrap(), expect);
}
