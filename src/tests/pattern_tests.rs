// src/tests/pattern_tests.rs

//! tests for `pattern.rs`

#![allow(non_snake_case)]

use crate::data::field::{
    DateFormat,
    Field,
    FieldKind,
    Fields,
    LevelNames,
    LogLevel,
    TimeFraction,
};
use crate::data::pattern::{LinePattern, LinePatternP};
use crate::tests::common::{fields_std, pattern_std, TEMPLATE_STD};

use std::io::ErrorKind;
use std::thread;

use ::test_case::test_case;

fn values(fields: &Fields) -> Vec<(FieldKind, String)> {
    fields
        .iter()
        .map(|f| (f.kind(), String::from(f.value().unwrap_or("<unset>"))))
        .collect()
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_LinePattern_is_send_sync() {
    assert_send_sync::<LinePattern>();
    assert_send_sync::<LinePatternP>();
}

#[test_case("", 0; "empty")]
#[test_case("no placeholders", 0)]
#[test_case("{}", 1; "one")]
#[test_case("{}{}", 2; "two adjacent")]
#[test_case("[{} {}] [{}] [{}] {}", 5; "standard")]
#[test_case("{ }", 0; "split braces")]
#[test_case("{{}}", 1; "doubled braces")]
fn test_count_placeholders(
    template: &str,
    expect: usize,
) {
    assert_eq!(LinePattern::count_placeholders(template), expect);
}

#[test_case("[{}] {}", 1; "too few fields")]
#[test_case("[{}] {}", 3; "too many fields")]
#[test_case("no placeholders", 1; "no placeholders one field")]
#[test_case("{}", 0; "one placeholder no fields")]
fn test_LinePattern_new_count_mismatch(
    template: &str,
    field_count: usize,
) {
    let fields: Fields = (0..field_count)
        .map(|_| Field::logger_name())
        .collect();
    let err = LinePattern::new(template, fields).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_LinePattern_new_bad_field() {
    let fields: Fields = vec![Field::time(TimeFraction::new(
        crate::data::field::FractionUnit::Milliseconds,
        0,
        '.',
    ))];
    let err = LinePattern::new("{}", fields).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_LinePattern_new_std() {
    let pattern = LinePattern::new(TEMPLATE_STD, fields_std()).unwrap();
    assert_eq!(pattern.template(), TEMPLATE_STD);
    assert_eq!(pattern.len(), 5);
    assert!(!pattern.is_empty());
    assert_eq!(
        pattern.regex_str(),
        r"\[([0-9]{4}[-/.][0-9]{1,2}[-/.][0-9]{1,2}) ([0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3})\] \[(.*?)\] \[(.*?)\] (.*?)$"
    );
    for field in pattern.schema().iter() {
        assert!(!field.is_set(), "schema field {} is set", field.kind());
    }
}

#[test]
fn test_LinePattern_regex_str_escapes_literals() {
    let pattern = LinePattern::new("({}) *{}* $", vec![Field::level(), Field::logger_name()]).unwrap();
    assert_eq!(pattern.regex_str(), r"\((.*?)\) \*(.*?)\* \$");
}

#[test]
fn test_match_line_hello_world() {
    let pattern = pattern_std();
    let fields = pattern
        .match_line("[2023-07-19 12:55:48.691] [Main] [debug] Hello World")
        .unwrap();
    assert_eq!(
        values(&fields),
        vec![
            (FieldKind::Date, String::from("2023-07-19")),
            (FieldKind::Time, String::from("12:55:48.691")),
            (FieldKind::LoggerName, String::from("Main")),
            (FieldKind::Level, String::from("debug")),
            (FieldKind::Message, String::from("Hello World")),
        ]
    );
    assert_eq!(fields[3].as_level().unwrap().level(), LogLevel::Debug);
    // the schema is not changed by matching
    assert!(!pattern.schema()[0].is_set());
}

#[test_case("  at frame1"; "stack frame")]
#[test_case(""; "empty")]
#[test_case("[2023-07-19 12:55:48] [Main] [debug] no fraction"; "no fraction")]
#[test_case("[19-07-2023 12:55:48.691] [Main] [debug] day first"; "day first")]
#[test_case("2023-07-19 12:55:48.691 Main debug no brackets"; "no brackets")]
#[test_case("[٢٠٢٣-٠٧-١٩ ١٢:٥٥:٤٨.٦٩١] [Main] [debug] arabic-indic digits"; "arabic-indic digits")]
fn test_match_line_none(line: &str) {
    let pattern = pattern_std();
    assert!(pattern.match_line(line).is_none(), "{:?}", line);
    assert!(!pattern.is_match(line), "{:?}", line);
}

#[test]
fn test_match_line_message_empty() {
    let pattern = pattern_std();
    let fields = pattern
        .match_line("[2023-07-19 12:55:48.691] [Main] [info] ")
        .unwrap();
    assert_eq!(fields[4].value(), Some(""));
}

#[test]
fn test_match_line_message_keeps_brackets() {
    let pattern = pattern_std();
    let fields = pattern
        .match_line("[2023-07-19 12:55:48.691] [Main] [info] [a] [b] c")
        .unwrap();
    assert_eq!(fields[2].value(), Some("Main"));
    assert_eq!(fields[3].value(), Some("info"));
    assert_eq!(fields[4].value(), Some("[a] [b] c"));
}

#[test]
fn test_match_line_no_fields() {
    let pattern = LinePattern::new("BEGIN", Fields::new()).unwrap();
    assert!(pattern.is_empty());
    assert_eq!(pattern.match_line("BEGIN transaction"), Some(Fields::new()));
    assert_eq!(pattern.match_line("END"), None);
}

#[test]
fn test_match_line_every_kind() {
    let fields: Fields = vec![
        Field::date(DateFormat::Dmy),
        Field::time(TimeFraction::microseconds()),
        Field::process_id(),
        Field::thread_id(),
        Field::level_with(LevelNames::default().with_name("W", LogLevel::Warn)),
        Field::source_file(),
        Field::source_line(),
        Field::source_function(),
        Field::message(),
    ];
    let pattern = LinePattern::new("{} {} {}/{} {} {}:{} {}(): {}", fields).unwrap();
    let fields = pattern
        .match_line("19.07.2023 12:55:48.000001 4242/7fa0 W main.rs:42 run(): disk low")
        .unwrap();
    assert_eq!(
        values(&fields),
        vec![
            (FieldKind::Date, String::from("19.07.2023")),
            (FieldKind::Time, String::from("12:55:48.000001")),
            (FieldKind::ProcessId, String::from("4242")),
            (FieldKind::ThreadId, String::from("7fa0")),
            (FieldKind::Level, String::from("W")),
            (FieldKind::SourceFile, String::from("main.rs")),
            (FieldKind::SourceLine, String::from("42")),
            (FieldKind::SourceFunction, String::from("run")),
            (FieldKind::Message, String::from("disk low")),
        ]
    );
    assert_eq!(fields[2].number(), Some(4242));
    assert_eq!(fields[4].as_level().unwrap().level(), LogLevel::Warn);
    assert_eq!(fields[6].number(), Some(42));
}

#[test]
fn test_match_line_concurrent() {
    const THREADS: usize = 8;
    const ITERATIONS: usize = 500;
    let pattern = pattern_std();
    let mut handles = Vec::with_capacity(THREADS);
    for t in 0..THREADS {
        let pattern = pattern.clone();
        handles.push(thread::spawn(move || {
            for i in 0..ITERATIONS {
                let line = format!("[2023-07-19 12:55:48.691] [T{}] [info] message {}", t, i);
                let fields = pattern.match_line(line.as_str()).unwrap();
                assert_eq!(fields[2].value().unwrap(), format!("T{}", t));
                assert_eq!(fields[4].value().unwrap(), format!("message {}", i));
                assert!(pattern.match_line("  continuation").is_none());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
