// src/observers/adapters.rs

//! Adapters implementing [`RecordObserver`]:
//!
//! * [`FnObserver`] calls a closure for each record.
//! * [`ChannelObserver`] sends each record over a [`crossbeam_channel`] to be
//!   received on another thread.

use crate::data::record::RecordP;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::readers::recordreader::RecordObserver;

use std::fmt;

use ::crossbeam_channel::{Receiver, Sender};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FnObserver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A [`RecordObserver`] calling a closure for each record.
pub struct FnObserver<F>
where
    F: Fn(&RecordP) + Send + Sync,
{
    on_record: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&RecordP) + Send + Sync,
{
    pub fn new(on_record: F) -> FnObserver<F> {
        FnObserver { on_record }
    }
}

impl<F> fmt::Debug for FnObserver<F>
where
    F: Fn(&RecordP) + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("FnObserver")
    }
}

impl<F> RecordObserver for FnObserver<F>
where
    F: Fn(&RecordP) + Send + Sync,
{
    fn on_record(
        &self,
        record: &RecordP,
    ) {
        (self.on_record)(record)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ChannelObserver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sent by a [`ChannelObserver`].
#[derive(Debug)]
pub enum RecordMessage {
    Record(RecordP),
    /// No more records follow.
    Eof,
}

pub type ChanSendRecord = Sender<RecordMessage>;
pub type ChanRecvRecord = Receiver<RecordMessage>;

/// A [`RecordObserver`] sending each record over a channel.
///
/// With a bounded channel, a slow receiver slows the reading of the file.
/// If the receiver is dropped, records are discarded.
#[derive(Debug)]
pub struct ChannelObserver {
    sender: ChanSendRecord,
}

impl ChannelObserver {
    pub fn new(sender: ChanSendRecord) -> ChannelObserver {
        ChannelObserver { sender }
    }

    /// Create a `ChannelObserver` and the receiving end of a channel holding
    /// at most `capacity` messages.
    pub fn bounded(capacity: usize) -> (ChannelObserver, ChanRecvRecord) {
        let (sender, receiver) = ::crossbeam_channel::bounded(capacity);

        (ChannelObserver::new(sender), receiver)
    }

    /// As [`bounded`] with no limit to messages held.
    ///
    /// [`bounded`]: ChannelObserver::bounded
    pub fn unbounded() -> (ChannelObserver, ChanRecvRecord) {
        let (sender, receiver) = ::crossbeam_channel::unbounded();

        (ChannelObserver::new(sender), receiver)
    }

    fn send(
        &self,
        message: RecordMessage,
    ) {
        if let Err(_err) = self.sender.send(message) {
            de_wrn!("ChannelObserver receiver is gone; {}", _err);
        }
    }
}

impl RecordObserver for ChannelObserver {
    fn on_record(
        &self,
        record: &RecordP,
    ) {
        self.send(RecordMessage::Record(record.clone()));
    }

    fn on_eof(&self) {
        defñ!();
        self.send(RecordMessage::Eof);
    }
}
