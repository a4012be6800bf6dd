// src/observers/mod.rs

//! Implementations of [`RecordObserver`].
//!
//! * A [`LevelMonitor`] indexes records by severity level.
//! * A [`Timeline`] indexes header records by second.
//! * A [`FnObserver`] and a [`ChannelObserver`] adapt closures and channels.
//!
//! [`RecordObserver`]: crate::readers::recordreader::RecordObserver
//! [`LevelMonitor`]: crate::observers::levelmonitor::LevelMonitor
//! [`Timeline`]: crate::observers::timeline::Timeline
//! [`FnObserver`]: crate::observers::adapters::FnObserver
//! [`ChannelObserver`]: crate::observers::adapters::ChannelObserver

pub mod adapters;
pub mod levelmonitor;
pub mod timeline;
