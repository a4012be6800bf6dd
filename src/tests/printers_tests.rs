// src/tests/printers_tests.rs

//! tests for `src/debug/printers.rs`

#![allow(non_snake_case)]

use crate::debug::printers::{buffer_to_String_noraw, char_to_char_noraw, str_to_String_noraw};

use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case('a', 'a')]
#[test_case('\0', '␀'; "nul")]
#[test_case('\t', '␉'; "tab")]
#[test_case('\n', '␊'; "newline")]
#[test_case('\r', '␍'; "carriage return")]
#[test_case('\u{7F}', '␡'; "delete")]
#[test_case('é', 'é'; "non-ascii")]
fn test_char_to_char_noraw(
    c: char,
    expect: char,
) {
    assert_eq!(char_to_char_noraw(c), expect);
}

#[test_case(b"", ""; "empty")]
#[test_case(b"abc", "abc")]
#[test_case(b"ab\r\n", "ab␍␊"; "crlf")]
#[test_case(b"a\xFFb", "a\u{FFFD}b"; "invalid")]
fn test_buffer_to_String_noraw(
    buffer: &[u8],
    expect: &str,
) {
    assert_eq!(buffer_to_String_noraw(buffer), expect);
}

#[test]
fn test_str_to_String_noraw() {
    assert_eq!(str_to_String_noraw("[info]\thello\n"), "[info]␉hello␊");
}
