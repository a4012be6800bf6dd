// src/observers/levelmonitor.rs

//! Implements a [`LevelMonitor`], an index of [`Record`]s by [`LogLevel`].
//!
//! A continuation record is indexed under the level of its header record,
//! so every line of a multi-line `error` message is found under
//! `LogLevel::Error`. An orphan continuation, and a header record without a
//! `Level` field, is indexed under `LogLevel::Unknown`.
//!
//! [`Record`]: crate::data::record::Record
//! [`LogLevel`]: crate::data::field::LogLevel

use crate::common::{Count, LineUid};
use crate::data::field::{LogLevel, LOGLEVEL_ALL};
use crate::data::record::RecordP;
use crate::readers::recordreader::RecordObserver;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Mapping of level to the `uid`s of records, in `uid` order.
pub type LevelUids = BTreeMap<LogLevel, Vec<LineUid>>;

#[derive(Debug, Default)]
struct LevelIndex {
    levels: LevelUids,
    /// `uid` and level of the most recent header record.
    header: Option<(LineUid, LogLevel)>,
}

impl LevelIndex {
    fn insert(
        &mut self,
        record: &RecordP,
    ) {
        let level: LogLevel = if record.is_header() {
            let level: LogLevel = record
                .level()
                .unwrap_or_default();
            self.header = Some((record.uid(), level));
            level
        } else {
            match (self.header, record.parent_uid()) {
                (Some((header_uid, level)), Some(parent_uid)) if header_uid == parent_uid => level,
                _ => LogLevel::Unknown,
            }
        };
        defñ!("uid {} level {}", record.uid(), level);
        self.levels
            .entry(level)
            .or_default()
            .push(record.uid());
    }
}

/// A [`RecordObserver`] indexing records by level.
/// See the [module documentation].
///
/// [module documentation]: self
#[derive(Debug, Default)]
pub struct LevelMonitor {
    index: Mutex<LevelIndex>,
}

impl LevelMonitor {
    pub fn new() -> LevelMonitor {
        LevelMonitor::default()
    }

    fn lock(&self) -> MutexGuard<'_, LevelIndex> {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The `uid`s of records of `level`, in `uid` order.
    pub fn uids(
        &self,
        level: LogLevel,
    ) -> Vec<LineUid> {
        self.lock()
            .levels
            .get(&level)
            .cloned()
            .unwrap_or_default()
    }

    /// Count of records of `level`.
    pub fn count(
        &self,
        level: LogLevel,
    ) -> Count {
        self.lock()
            .levels
            .get(&level)
            .map_or(0, |uids| uids.len() as Count)
    }

    /// Count of records for every level, in level order, including levels
    /// with no records.
    pub fn counts(&self) -> Vec<(LogLevel, Count)> {
        let index = self.lock();
        LOGLEVEL_ALL
            .iter()
            .map(|level| {
                (*level, index.levels.get(level).map_or(0, |uids| uids.len() as Count))
            })
            .collect()
    }

    /// Count of records of all levels.
    pub fn total(&self) -> Count {
        self.lock()
            .levels
            .values()
            .map(|uids| uids.len() as Count)
            .sum()
    }

    /// Copy of the whole index.
    pub fn levels(&self) -> LevelUids {
        self.lock().levels.clone()
    }
}

impl RecordObserver for LevelMonitor {
    fn on_record(
        &self,
        record: &RecordP,
    ) {
        self.lock().insert(record);
    }
}
