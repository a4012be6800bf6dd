// src/data/field.rs
// … ≤ ≥ ≠

//! Implements [`Field`], the typed recognizer and holder of one token of a
//! log line header, e.g. a date, a time, or a severity level.
//!
//! A `Field` has two roles:
//! 1. as a _schema_ descriptor (no value), it provides the regular expression
//!    fragment used by a [`LinePattern`] to find the token
//! 2. as a _populated_ descriptor, it holds the captured text of the token
//!    and values derived from that text
//!
//! A populated `Field` is made by cloning a schema `Field` and setting the
//! captured value. The captured value is set once. Cloning never shares the
//! captured value.
//!
//! The regular expression fragments are the `CGP_*` constants. Each fragment
//! is exactly one capturing group.
//!
//! [`LinePattern`]: crate::data::pattern::LinePattern

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ::chrono::{NaiveDate, NaiveTime};
use ::const_format::concatcp;
use ::lazy_static::lazy_static;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Regex fragments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Regular expression pattern, passed to [`regex::Regex::new`].
pub type RegexPattern = str;

/// Regular expression capture group pattern, used within a [`RegexPattern`].
pub type CaptureGroupPattern = str;

/// Regex pattern for a date separator, e.g. `-` in `2023-07-19`.
const RP_DATE_SEP: &RegexPattern = r"[-/.]";

/// Regex capture group pattern for a date with the year first,
/// e.g. `2023-07-19` or `2023/7/19`.
pub const CGP_DATE_YMD: &CaptureGroupPattern =
    concatcp!(r"([0-9]{4}", RP_DATE_SEP, r"[0-9]{1,2}", RP_DATE_SEP, r"[0-9]{1,2})");

/// Regex capture group pattern for a date with the day first,
/// e.g. `19-07-2023` or `19.7.2023`.
pub const CGP_DATE_DMY: &CaptureGroupPattern =
    concatcp!(r"([0-9]{1,2}", RP_DATE_SEP, r"[0-9]{1,2}", RP_DATE_SEP, r"[0-9]{4})");

/// Regex pattern for a clock time `HH:MM:SS` (not a capture group).
pub const RP_TIME_HMS: &RegexPattern = r"[0-9]{2}:[0-9]{2}:[0-9]{2}";

/// Regex capture group pattern for a clock time without fractional seconds.
pub const CGP_TIME_HMS: &CaptureGroupPattern = concatcp!("(", RP_TIME_HMS, ")");

/// Regex capture group pattern for any text, matched lazily.
/// Used by logger names, level names, and source file and function names.
pub const CGP_ANY_LAZY: &CaptureGroupPattern = r"(.*?)";

/// Regex capture group pattern for a thread id, decimal or hexadecimal.
pub const CGP_HEX: &CaptureGroupPattern = r"([A-Fa-f0-9]+)";

/// Regex capture group pattern for a process id or source line number.
pub const CGP_DIGITS: &CaptureGroupPattern = r"([0-9]+)";

/// Regex capture group pattern for the message; captures the remainder of
/// the line.
pub const CGP_MESSAGE: &CaptureGroupPattern = r"(.*?)$";

/// Largest allowed count of fractional second digits (nanosecond precision).
pub const FRACTION_DIGITS_MAX: u8 = 9;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Date
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Order of the parts of a date.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    Ymd,
    /// `DD-MM-YYYY`
    Dmy,
}

/// A date token, e.g. `2023-07-19`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DateField {
    format: DateFormat,
    value: Option<String>,
}

impl DateField {
    pub fn new(format: DateFormat) -> DateField {
        DateField { format, value: None }
    }

    pub fn format(&self) -> DateFormat {
        self.format
    }

    pub fn to_regex(&self) -> &'static CaptureGroupPattern {
        match self.format {
            DateFormat::Ymd => CGP_DATE_YMD,
            DateFormat::Dmy => CGP_DATE_DMY,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The captured date as a [`NaiveDate`]. `None` if no value is set or
    /// the value is not a valid calendar date, e.g. `2023-02-30`.
    ///
    /// [`NaiveDate`]: https://docs.rs/chrono/0.4.40/chrono/naive/struct.NaiveDate.html
    pub fn naive_date(&self) -> Option<NaiveDate> {
        let value = self.value.as_deref()?;
        let mut parts = value.split(['-', '/', '.']);
        let a: u32 = parts.next()?.parse().ok()?;
        let b: u32 = parts.next()?.parse().ok()?;
        let c: u32 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let (year, month, day) = match self.format {
            DateFormat::Ymd => (a, b, c),
            DateFormat::Dmy => (c, b, a),
        };

        NaiveDate::from_ymd_opt(year as i32, month, day)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Time
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Unit of the fractional seconds of a time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FractionUnit {
    /// No fractional seconds, e.g. `12:55:48`.
    #[default]
    None,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl FractionUnit {
    /// The count of digits this unit is conventionally written with.
    pub const fn digits_natural(&self) -> u8 {
        match self {
            FractionUnit::None => 0,
            FractionUnit::Milliseconds => 3,
            FractionUnit::Microseconds => 6,
            FractionUnit::Nanoseconds => 9,
        }
    }
}

/// Configuration of the fractional seconds of a [`TimeField`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimeFraction {
    pub unit: FractionUnit,
    /// Exact count of fractional digits. Must be `1‥=9` when `unit` is not
    /// `None`.
    pub digits: u8,
    /// Character between the seconds and the fractional digits.
    pub separator: char,
}

impl Default for TimeFraction {
    fn default() -> Self {
        TimeFraction {
            unit: FractionUnit::None,
            digits: 3,
            separator: '.',
        }
    }
}

impl TimeFraction {
    pub fn new(
        unit: FractionUnit,
        digits: u8,
        separator: char,
    ) -> TimeFraction {
        TimeFraction { unit, digits, separator }
    }

    /// `HH:MM:SS` with no fractional seconds.
    pub fn none() -> TimeFraction {
        TimeFraction::default()
    }

    /// `HH:MM:SS.mmm`
    pub fn milliseconds() -> TimeFraction {
        TimeFraction::new(FractionUnit::Milliseconds, 3, '.')
    }

    /// `HH:MM:SS.uuuuuu`
    pub fn microseconds() -> TimeFraction {
        TimeFraction::new(FractionUnit::Microseconds, 6, '.')
    }

    /// `HH:MM:SS.nnnnnnnnn`
    pub fn nanoseconds() -> TimeFraction {
        TimeFraction::new(FractionUnit::Nanoseconds, 9, '.')
    }

    pub const fn has_fraction(&self) -> bool {
        !matches!(self.unit, FractionUnit::None)
    }
}

/// Numeric parts of a captured time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TimeComponents {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Fractional digits as written, e.g. `691` for `12:55:48.691`.
    /// Zero if there is no fraction.
    pub fraction: u32,
}

/// A clock time token, e.g. `12:55:48.691`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TimeField {
    fraction: TimeFraction,
    value: Option<String>,
    components: Option<TimeComponents>,
}

impl TimeField {
    pub fn new(fraction: TimeFraction) -> TimeField {
        TimeField {
            fraction,
            value: None,
            components: None,
        }
    }

    pub fn fraction(&self) -> &TimeFraction {
        &self.fraction
    }

    pub fn to_regex(&self) -> Cow<'static, CaptureGroupPattern> {
        if !self.fraction.has_fraction() {
            return Cow::Borrowed(CGP_TIME_HMS);
        }
        let sep: String = ::regex::escape(self.fraction.separator.encode_utf8(&mut [0; 4]));

        Cow::Owned(format!(r"({}{}[0-9]{{{}}})", RP_TIME_HMS, sep, self.fraction.digits))
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Numeric parts of the captured time. `None` if no value is set.
    pub fn components(&self) -> Option<TimeComponents> {
        self.components
    }

    /// The fractional seconds as nanoseconds, scaled by the configured count
    /// of digits, e.g. `691` with 3 digits is 691,000,000 nanoseconds.
    pub fn fraction_nanos(&self) -> Option<u32> {
        let components = self.components?;
        if !self.fraction.has_fraction() {
            return Some(0);
        }
        let digits = self.fraction.digits.min(FRACTION_DIGITS_MAX) as u32;

        Some(components.fraction * 10u32.pow(FRACTION_DIGITS_MAX as u32 - digits))
    }

    /// Duration since midnight of the captured time.
    pub fn duration(&self) -> Option<Duration> {
        let c = self.components?;
        let secs: u64 = c.hour as u64 * 3600 + c.minute as u64 * 60 + c.second as u64;

        Some(Duration::new(secs, self.fraction_nanos()?))
    }

    /// The captured time as a [`NaiveTime`]. `None` if no value is set or the
    /// value is not a valid time of day, e.g. `25:00:00`.
    ///
    /// [`NaiveTime`]: https://docs.rs/chrono/0.4.40/chrono/naive/struct.NaiveTime.html
    pub fn naive_time(&self) -> Option<NaiveTime> {
        let c = self.components?;

        NaiveTime::from_hms_nano_opt(c.hour, c.minute, c.second, self.fraction_nanos()?)
    }

    fn set_value(
        &mut self,
        value: &str,
    ) {
        self.components = Self::split_components(value, &self.fraction);
        self.value = Some(String::from(value));
    }

    /// Split `HH:MM:SS[<sep>F…]` into numbers.
    fn split_components(
        value: &str,
        fraction: &TimeFraction,
    ) -> Option<TimeComponents> {
        defn!("({:?})", value);
        let hms: &str = value.get(..8)?;
        let mut parts = hms.split(':');
        let hour: u32 = parts.next()?.parse().ok()?;
        let minute: u32 = parts.next()?.parse().ok()?;
        let second: u32 = parts.next()?.parse().ok()?;
        let mut frac: u32 = 0;
        if fraction.has_fraction() {
            let rest: &str = &value[8..];
            let digits: &str = rest.strip_prefix(fraction.separator)?;
            frac = digits.parse().ok()?;
        }
        let components = TimeComponents {
            hour,
            minute,
            second,
            fraction: frac,
        };
        defx!("{:?}", components);

        Some(components)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Level
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity of a log message.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LogLevel {
    /// The level name was not recognized, or there was no level.
    #[default]
    Unknown,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

/// All [`LogLevel`] variants in ascending order.
pub const LOGLEVEL_ALL: [LogLevel; 7] = [
    LogLevel::Unknown,
    LogLevel::Trace,
    LogLevel::Debug,
    LogLevel::Info,
    LogLevel::Warn,
    LogLevel::Error,
    LogLevel::Critical,
];

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Unknown => "unknown",
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    /// Parse a level name, case-insensitive.
    fn from_str(s: &str) -> Result<LogLevel> {
        let lower: String = s.to_ascii_lowercase();
        for level in LOGLEVEL_ALL.iter() {
            if level.as_str() == lower {
                return Ok(*level);
            }
        }

        Err(Error::new(ErrorKind::InvalidInput, format!("unknown log level {:?}", s)))
    }
}

/// Default names of levels as written in log files.
const LEVEL_NAMES_DEFAULT: [(&str, LogLevel); 7] = [
    ("unknown", LogLevel::Unknown),
    ("trace", LogLevel::Trace),
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warn),
    ("error", LogLevel::Error),
    ("critical", LogLevel::Critical),
];

/// Mapping of level names as written in a log file to [`LogLevel`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LevelNames {
    map: HashMap<String, LogLevel>,
}

impl Default for LevelNames {
    fn default() -> Self {
        let mut map = HashMap::<String, LogLevel>::with_capacity(LEVEL_NAMES_DEFAULT.len());
        for (name, level) in LEVEL_NAMES_DEFAULT.iter() {
            map.insert(String::from(*name), *level);
        }

        LevelNames { map }
    }
}

impl LevelNames {
    /// Add or replace the mapping of `name` to `level`.
    pub fn with_name(
        mut self,
        name: impl Into<String>,
        level: LogLevel,
    ) -> LevelNames {
        self.map.insert(name.into(), level);

        self
    }

    /// The `LogLevel` for `name`. An exact match is tried first, then the
    /// ASCII lowercase `name`. Unmapped names are `LogLevel::Unknown`.
    pub fn level_of(
        &self,
        name: &str,
    ) -> LogLevel {
        if let Some(level) = self.map.get(name) {
            return *level;
        }
        match self.map.get(&name.to_ascii_lowercase()) {
            Some(level) => *level,
            None => LogLevel::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

lazy_static! {
    /// Shared default [`LevelNames`]; every `Field::level()` points here.
    static ref LEVEL_NAMES_DEFAULT_P: Arc<LevelNames> = Arc::new(LevelNames::default());
}

/// A severity level token, e.g. `debug`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelField {
    /// Shared, never mutated after construction.
    names: Arc<LevelNames>,
    value: Option<String>,
    level: LogLevel,
}

impl Default for LevelField {
    fn default() -> Self {
        LevelField::new(LEVEL_NAMES_DEFAULT_P.clone())
    }
}

impl LevelField {
    pub fn new(names: Arc<LevelNames>) -> LevelField {
        LevelField {
            names,
            value: None,
            level: LogLevel::Unknown,
        }
    }

    pub fn names(&self) -> &LevelNames {
        &self.names
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The severity of the captured level name.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn set_value(
        &mut self,
        value: &str,
    ) {
        self.level = self.names.level_of(value);
        self.value = Some(String::from(value));
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Field
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A token of text with no configuration, e.g. a logger name.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct TextField {
    value: Option<String>,
}

impl TextField {
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// The kind of a [`Field`], without configuration or value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FieldKind {
    Date,
    Time,
    LoggerName,
    Level,
    ThreadId,
    ProcessId,
    SourceFile,
    SourceFunction,
    SourceLine,
    Message,
}

impl FieldKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::LoggerName => "logger",
            FieldKind::Level => "level",
            FieldKind::ThreadId => "thread",
            FieldKind::ProcessId => "pid",
            FieldKind::SourceFile => "file",
            FieldKind::SourceFunction => "function",
            FieldKind::SourceLine => "line",
            FieldKind::Message => "message",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One token of a log line header. See the [module documentation].
///
/// [module documentation]: self
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Date(DateField),
    Time(TimeField),
    LoggerName(TextField),
    Level(LevelField),
    ThreadId(TextField),
    ProcessId(TextField),
    SourceFile(TextField),
    SourceFunction(TextField),
    SourceLine(TextField),
    Message(TextField),
}

/// Ordered sequence of [`Field`]s.
pub type Fields = Vec<Field>;

impl Field {
    pub fn date(format: DateFormat) -> Field {
        Field::Date(DateField::new(format))
    }

    pub fn time(fraction: TimeFraction) -> Field {
        Field::Time(TimeField::new(fraction))
    }

    pub fn logger_name() -> Field {
        Field::LoggerName(TextField::default())
    }

    /// A level with the default level names.
    pub fn level() -> Field {
        Field::Level(LevelField::default())
    }

    /// A level with custom level names.
    pub fn level_with(names: LevelNames) -> Field {
        Field::Level(LevelField::new(Arc::new(names)))
    }

    pub fn thread_id() -> Field {
        Field::ThreadId(TextField::default())
    }

    pub fn process_id() -> Field {
        Field::ProcessId(TextField::default())
    }

    pub fn source_file() -> Field {
        Field::SourceFile(TextField::default())
    }

    pub fn source_function() -> Field {
        Field::SourceFunction(TextField::default())
    }

    pub fn source_line() -> Field {
        Field::SourceLine(TextField::default())
    }

    pub fn message() -> Field {
        Field::Message(TextField::default())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Date(_) => FieldKind::Date,
            Field::Time(_) => FieldKind::Time,
            Field::LoggerName(_) => FieldKind::LoggerName,
            Field::Level(_) => FieldKind::Level,
            Field::ThreadId(_) => FieldKind::ThreadId,
            Field::ProcessId(_) => FieldKind::ProcessId,
            Field::SourceFile(_) => FieldKind::SourceFile,
            Field::SourceFunction(_) => FieldKind::SourceFunction,
            Field::SourceLine(_) => FieldKind::SourceLine,
            Field::Message(_) => FieldKind::Message,
        }
    }

    /// The regular expression fragment that finds this token. Exactly one
    /// capturing group.
    pub fn to_regex(&self) -> Cow<'static, CaptureGroupPattern> {
        match self {
            Field::Date(date) => Cow::Borrowed(date.to_regex()),
            Field::Time(time) => time.to_regex(),
            Field::LoggerName(_)
            | Field::Level(_)
            | Field::SourceFile(_)
            | Field::SourceFunction(_) => Cow::Borrowed(CGP_ANY_LAZY),
            Field::ThreadId(_) => Cow::Borrowed(CGP_HEX),
            Field::ProcessId(_) | Field::SourceLine(_) => Cow::Borrowed(CGP_DIGITS),
            Field::Message(_) => Cow::Borrowed(CGP_MESSAGE),
        }
    }

    /// The captured text. `None` for a schema descriptor.
    pub fn value(&self) -> Option<&str> {
        match self {
            Field::Date(date) => date.value(),
            Field::Time(time) => time.value(),
            Field::Level(level) => level.value(),
            Field::LoggerName(text)
            | Field::ThreadId(text)
            | Field::ProcessId(text)
            | Field::SourceFile(text)
            | Field::SourceFunction(text)
            | Field::SourceLine(text)
            | Field::Message(text) => text.value(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.value().is_some()
    }

    /// Set the captured text. Only the matcher sets values, and only once
    /// per `Field`.
    pub(crate) fn set_value(
        &mut self,
        value: &str,
    ) {
        debug_assert!(!self.is_set(), "Field {} value already set", self.kind());
        match self {
            Field::Date(date) => date.value = Some(String::from(value)),
            Field::Time(time) => time.set_value(value),
            Field::Level(level) => level.set_value(value),
            Field::LoggerName(text)
            | Field::ThreadId(text)
            | Field::ProcessId(text)
            | Field::SourceFile(text)
            | Field::SourceFunction(text)
            | Field::SourceLine(text)
            | Field::Message(text) => text.value = Some(String::from(value)),
        }
    }

    /// Clone the configuration of this `Field` without the captured value.
    pub fn clone_schema(&self) -> Field {
        match self {
            Field::Date(date) => Field::date(date.format),
            Field::Time(time) => Field::time(time.fraction),
            Field::Level(level) => Field::Level(LevelField::new(level.names.clone())),
            Field::LoggerName(_) => Field::logger_name(),
            Field::ThreadId(_) => Field::thread_id(),
            Field::ProcessId(_) => Field::process_id(),
            Field::SourceFile(_) => Field::source_file(),
            Field::SourceFunction(_) => Field::source_function(),
            Field::SourceLine(_) => Field::source_line(),
            Field::Message(_) => Field::message(),
        }
    }

    /// Check the configuration can produce a usable regex fragment.
    pub fn validate(&self) -> Result<()> {
        if let Field::Time(time) = self {
            let fraction = time.fraction();
            if fraction.has_fraction()
                && (fraction.digits == 0 || fraction.digits > FRACTION_DIGITS_MAX)
            {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "time fraction digits {} must be 1 to {}",
                        fraction.digits, FRACTION_DIGITS_MAX
                    ),
                ));
            }
            if fraction.has_fraction() && fraction.separator.is_ascii_digit() {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("time fraction separator {:?} cannot be a digit", fraction.separator),
                ));
            }
        }

        Ok(())
    }

    pub fn as_date(&self) -> Option<&DateField> {
        match self {
            Field::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&TimeField> {
        match self {
            Field::Time(time) => Some(time),
            _ => None,
        }
    }

    pub fn as_level(&self) -> Option<&LevelField> {
        match self {
            Field::Level(level) => Some(level),
            _ => None,
        }
    }

    /// The captured value of a `ProcessId` or `SourceLine` as a number.
    pub fn number(&self) -> Option<u64> {
        match self {
            Field::ProcessId(text) | Field::SourceLine(text) => text.value()?.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.value().unwrap_or(""))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// parsing field specifications, e.g. from the command-line
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn err_field_spec(
    spec: &str,
    why: &str,
) -> Error {
    Error::new(ErrorKind::InvalidInput, format!("bad field {:?}; {}", spec, why))
}

/// Parse a `time` specification `time[:UNIT[:DIGITS[:SEP]]]`.
/// The separator is the remainder so it may be `:`.
fn time_fraction_from_str(
    spec: &str,
    args: &str,
) -> Result<TimeFraction> {
    let mut parts = args.splitn(3, ':');
    let unit: FractionUnit = match parts.next().unwrap_or("") {
        "" | "none" => FractionUnit::None,
        "ms" => FractionUnit::Milliseconds,
        "us" | "µs" => FractionUnit::Microseconds,
        "ns" => FractionUnit::Nanoseconds,
        _ => return Err(err_field_spec(spec, "time unit must be one of none, ms, us, ns")),
    };
    let digits: u8 = match parts.next() {
        None | Some("") => unit.digits_natural(),
        Some(d) => d
            .parse::<u8>()
            .map_err(|_| err_field_spec(spec, "time digits must be a number"))?,
    };
    let separator: char = match parts.next() {
        None | Some("") => '.',
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(err_field_spec(spec, "time separator must be one character")),
            }
        }
    };

    Ok(TimeFraction::new(unit, digits, separator))
}

/// Parse a `level` specification `level[:NAME=LEVEL,…]`.
fn level_names_from_str(
    spec: &str,
    args: &str,
) -> Result<LevelNames> {
    let mut names = LevelNames::default();
    for pair in args.split(',').filter(|p| !p.is_empty()) {
        let (name, level) = match pair.split_once('=') {
            Some((n, l)) if !n.is_empty() => (n, l),
            _ => return Err(err_field_spec(spec, "level names must be NAME=LEVEL")),
        };
        let level: LogLevel = level.parse()?;
        names = names.with_name(name, level);
    }

    Ok(names)
}

impl FromStr for Field {
    type Err = Error;

    /// Parse a short field specification, e.g. `date:dmy`, `time:ms:3:.`,
    /// `level:warning=warn`, `message`.
    fn from_str(spec: &str) -> Result<Field> {
        defn!("({:?})", spec);
        let (name, args): (&str, &str) = match spec.split_once(':') {
            Some((n, a)) => (n, a),
            None => (spec, ""),
        };
        let field: Field = match name {
            "date" => match args {
                "" | "ymd" => Field::date(DateFormat::Ymd),
                "dmy" => Field::date(DateFormat::Dmy),
                _ => return Err(err_field_spec(spec, "date format must be ymd or dmy")),
            },
            "time" => Field::time(time_fraction_from_str(spec, args)?),
            "level" => match args {
                "" => Field::level(),
                _ => Field::level_with(level_names_from_str(spec, args)?),
            },
            _ if !args.is_empty() => {
                return Err(err_field_spec(spec, "only date, time, and level take arguments"));
            }
            "logger" => Field::logger_name(),
            "thread" => Field::thread_id(),
            "pid" => Field::process_id(),
            "file" => Field::source_file(),
            "function" => Field::source_function(),
            "line" => Field::source_line(),
            "message" => Field::message(),
            _ => return Err(err_field_spec(spec, "unknown field name")),
        };
        field.validate()?;
        defx!("{:?}", field);

        Ok(field)
    }
}
