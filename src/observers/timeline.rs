// src/observers/timeline.rs

//! Implements a [`Timeline`], an index of header [`Record`]s by the second of
//! their timestamp.
//!
//! The timestamp of a record is made from its `Date` and `Time` fields.
//! Fractional seconds are dropped. A record with a `Time` field but no
//! `Date` field is placed on [`date_none`]. A record without a valid `Time`
//! field is not placed on the timeline; it is counted in
//! [`Timeline::untimed`].
//!
//! Continuation records are not placed on the timeline.
//!
//! [`Record`]: crate::data::record::Record

use crate::common::{Count, LineUid};
use crate::data::field::FieldKind;
use crate::data::record::{Record, RecordP};
use crate::readers::recordreader::RecordObserver;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ::chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Date of records that have no `Date` field, `1970-01-01`.
pub fn date_none() -> NaiveDate {
    NaiveDate::default()
}

/// Mapping of a second to the `uid`s of header records in that second.
pub type Seconds = BTreeMap<NaiveDateTime, Vec<LineUid>>;

#[derive(Debug, Default)]
struct TimelineIndex {
    seconds: Seconds,
    untimed: Count,
}

/// The timestamp of `record` truncated to the second.
pub fn record_second(record: &Record) -> Option<NaiveDateTime> {
    let time: NaiveTime = record
        .get(FieldKind::Time)?
        .as_time()?
        .naive_time()?;
    let time: NaiveTime = time.with_nanosecond(0)?;
    let date: NaiveDate = match record.get(FieldKind::Date) {
        Some(field) => field.as_date()?.naive_date()?,
        None => date_none(),
    };

    Some(NaiveDateTime::new(date, time))
}

/// A [`RecordObserver`] indexing header records by second.
/// See the [module documentation].
///
/// [module documentation]: self
#[derive(Debug, Default)]
pub struct Timeline {
    index: Mutex<TimelineIndex>,
}

impl Timeline {
    pub fn new() -> Timeline {
        Timeline::default()
    }

    fn lock(&self) -> MutexGuard<'_, TimelineIndex> {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The `uid`s of header records within `second`.
    pub fn at(
        &self,
        second: &NaiveDateTime,
    ) -> Vec<LineUid> {
        self.lock()
            .seconds
            .get(second)
            .cloned()
            .unwrap_or_default()
    }

    /// The `uid`s of header records from `range.start()` to `range.end()`,
    /// inclusive, in time order.
    pub fn window(
        &self,
        range: RangeInclusive<NaiveDateTime>,
    ) -> Vec<LineUid> {
        self.lock()
            .seconds
            .range(range)
            .flat_map(|(_, uids)| uids.iter().copied())
            .collect()
    }

    /// Count of distinct seconds.
    pub fn len(&self) -> usize {
        self.lock().seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().seconds.is_empty()
    }

    /// Earliest and latest seconds.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let index = self.lock();
        let first = index.seconds.keys().next()?;
        let last = index.seconds.keys().next_back()?;

        Some((*first, *last))
    }

    /// Header records with no usable timestamp.
    pub fn untimed(&self) -> Count {
        self.lock().untimed
    }

    /// Copy of the whole index.
    pub fn seconds(&self) -> Seconds {
        self.lock().seconds.clone()
    }
}

impl RecordObserver for Timeline {
    fn on_record(
        &self,
        record: &RecordP,
    ) {
        if !record.is_header() {
            return;
        }
        let mut index = self.lock();
        match record_second(record) {
            Some(second) => {
                defñ!("uid {} at {}", record.uid(), second);
                index
                    .seconds
                    .entry(second)
                    .or_default()
                    .push(record.uid());
            }
            None => {
                defñ!("uid {} untimed", record.uid());
                index.untimed += 1;
            }
        }
    }
}
