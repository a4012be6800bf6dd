// src/readers/reactivequeue.rs

//! Implements a [`ReactiveQueue`], a bounded first-in first-out queue with
//! its own consumer thread.
//!
//! A producer calls [`push`] which blocks while the queue is full
//! (backpressure). The consumer thread takes each item from the head of the
//! queue and passes it to the one registered callback. The callback runs
//! outside of the queue's lock so producers may push while it runs.
//!
//! An item is counted in [`size`] until the callback for that item has
//! returned. So when [`drain_and_stop`] sees a `size` of zero, every pushed
//! item has been fully consumed.
//!
//! A panic within the callback is caught on the consumer thread. The panic
//! is counted and printed, and the consumer continues with the next item.
//!
//! [`push`]: ReactiveQueue::push
//! [`size`]: ReactiveQueue::size
//! [`drain_and_stop`]: ReactiveQueue::drain_and_stop

use crate::common::Count;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use ::min_max::max;
use ::more_asserts::{debug_assert_ge, debug_assert_le, debug_assert_lt};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Longest a waiting consumer thread sleeps before re-checking the queue.
pub const CONSUMER_WAIT: Duration = Duration::from_millis(50);

/// Default name of the consumer thread.
pub const CONSUMER_THREAD_NAME: &str = "reactivequeue-consumer";

/// The consumption callback of a [`ReactiveQueue`].
pub type Callback<T> = Box<dyn FnMut(T) + Send + 'static>;

/// Returned by [`ReactiveQueue::push`] and [`ReactiveQueue::push_timeout`]
/// when the item was not queued. The item is given back.
pub enum PushError<T> {
    /// The queue was stopped.
    Stopped(T),
    /// The queue stayed full until the timeout passed.
    Timeout(T),
}

impl<T> PushError<T> {
    /// Take back the item that was not queued.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Stopped(item) | PushError::Timeout(item) => item,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PushError::Timeout(_))
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PushError::Stopped(_))
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PushError::Stopped(_) => write!(f, "PushError::Stopped(..)"),
            PushError::Timeout(_) => write!(f, "PushError::Timeout(..)"),
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PushError::Stopped(_) => write!(f, "queue is stopped"),
            PushError::Timeout(_) => write!(f, "queue is full; push timed out"),
        }
    }
}

impl<T> std::error::Error for PushError<T> {}

/// Statistics of a [`ReactiveQueue`], for CLI option `--summary`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SummaryReactiveQueue {
    pub capacity: usize,
    /// Items queued by `push` or `push_timeout`.
    pub pushed: Count,
    /// Items passed to the callback.
    pub consumed: Count,
    /// Pushes that had to wait for space.
    pub pushes_blocked: Count,
    /// Pushes that gave up waiting for space.
    pub push_timeouts: Count,
    /// Callback invocations that panicked.
    pub callback_panics: Count,
    /// Most items held by the queue at once.
    pub high_water: usize,
}

/// State under the queue's `Mutex`.
struct QueueState<T> {
    /// Circular buffer; `None` is an empty slot.
    buffer: Box<[Option<T>]>,
    /// Index of the next item to consume.
    head: usize,
    /// Index of the next empty slot.
    tail: usize,
    /// Items queued plus the item being consumed, if any.
    size: usize,
    /// Taken by the consumer thread while the callback runs.
    callback: Option<Callback<T>>,
    has_callback: bool,
    stop: bool,
    summary: SummaryReactiveQueue,
}

struct Shared<T> {
    state: Mutex<QueueState<T>>,
    /// Notified when `size` decreases or on stop.
    cond_space: Condvar,
    /// Notified when an item or a callback arrives or on stop.
    cond_item: Condvar,
}

impl<T> Shared<T> {
    /// The callback never runs under the lock so a poisoned lock still holds
    /// consistent state.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A bounded FIFO queue with a dedicated consumer thread.
/// See the [module documentation].
///
/// [module documentation]: self
pub struct ReactiveQueue<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    capacity: usize,
    /// `None` after the consumer thread is joined.
    consumer: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<T: Send + 'static> fmt::Debug for ReactiveQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReactiveQueue")
            .field("capacity", &self.capacity)
            .field("size", &self.size())
            .field("running", &self.is_running())
            .finish()
    }
}

impl<T: Send + 'static> ReactiveQueue<T> {
    /// Create a queue holding at most `capacity` items and start its consumer
    /// thread. `capacity` of zero is `ErrorKind::InvalidInput`.
    pub fn new(capacity: usize) -> Result<ReactiveQueue<T>> {
        Self::with_name(capacity, CONSUMER_THREAD_NAME)
    }

    /// As [`new`], naming the consumer thread `name`.
    ///
    /// [`new`]: ReactiveQueue::new
    pub fn with_name(
        capacity: usize,
        name: &str,
    ) -> Result<ReactiveQueue<T>> {
        defn!("({}, {:?})", capacity, name);
        if capacity == 0 {
            defx!("capacity 0");
            return Err(Error::new(ErrorKind::InvalidInput, "queue capacity must be at least 1"));
        }
        let buffer: Box<[Option<T>]> = (0..capacity)
            .map(|_| None)
            .collect();
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                buffer,
                head: 0,
                tail: 0,
                size: 0,
                callback: None,
                has_callback: false,
                stop: false,
                summary: SummaryReactiveQueue {
                    capacity,
                    ..Default::default()
                },
            }),
            cond_space: Condvar::new(),
            cond_item: Condvar::new(),
        });
        let shared_thread = shared.clone();
        let consumer = thread::Builder::new()
            .name(String::from(name))
            .spawn(move || consumer_loop(shared_thread))?;
        defx!();

        Ok(ReactiveQueue {
            shared,
            capacity,
            consumer: Mutex::new(Some(consumer)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count of items queued or being consumed.
    pub fn size(&self) -> usize {
        self.shared.lock().size
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stop
    }

    /// The consumer thread has not been joined.
    pub fn is_running(&self) -> bool {
        self.consumer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn summary(&self) -> SummaryReactiveQueue {
        self.shared.lock().summary
    }

    /// Set the consumption callback, replacing any previous callback.
    /// Items are not consumed until a callback is registered.
    pub fn register_callback<F>(
        &self,
        callback: F,
    ) where
        F: FnMut(T) + Send + 'static,
    {
        defñ!();
        {
            let mut state = self.shared.lock();
            state.callback = Some(Box::new(callback));
            state.has_callback = true;
        }
        self.shared.cond_item.notify_all();
    }

    /// Append `item`. Blocks while the queue is full. Only fails if the queue
    /// is stopped, in which case `item` is given back.
    pub fn push(
        &self,
        item: T,
    ) -> std::result::Result<(), PushError<T>> {
        self.push_until(item, None)
    }

    /// Append `item`. Blocks while the queue is full but no longer than
    /// `timeout`, after which `item` is given back.
    pub fn push_timeout(
        &self,
        item: T,
        timeout: Duration,
    ) -> std::result::Result<(), PushError<T>> {
        self.push_until(item, Some(Instant::now() + timeout))
    }

    fn push_until(
        &self,
        item: T,
        deadline: Option<Instant>,
    ) -> std::result::Result<(), PushError<T>> {
        let mut state = self.shared.lock();
        let mut blocked: bool = false;
        while state.size >= self.capacity && !state.stop {
            blocked = true;
            match deadline {
                None => {
                    state = self
                        .shared
                        .cond_space
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.summary.push_timeouts += 1;
                        return Err(PushError::Timeout(item));
                    }
                    state = self
                        .shared
                        .cond_space
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        if state.stop {
            return Err(PushError::Stopped(item));
        }
        debug_assert_lt!(state.size, self.capacity);
        let tail: usize = state.tail;
        debug_assert!(state.buffer[tail].is_none(), "slot {} at tail is occupied", tail);
        state.buffer[tail] = Some(item);
        state.tail = (tail + 1) % self.capacity;
        state.size += 1;
        state.summary.pushed += 1;
        if blocked {
            state.summary.pushes_blocked += 1;
        }
        state.summary.high_water = max!(state.summary.high_water, state.size);
        drop(state);
        self.shared.cond_item.notify_one();

        Ok(())
    }

    /// Block until every pushed item has been consumed, then stop and join
    /// the consumer thread.
    ///
    /// If no callback was ever registered the queued items can never be
    /// consumed; they are discarded.
    pub fn drain_and_stop(&self) {
        defn!();
        {
            let mut state = self.shared.lock();
            while state.size > 0 && !state.stop {
                if !state.has_callback {
                    de_wrn!("ReactiveQueue has no callback; discarding {} items", state.size);
                    break;
                }
                state = self
                    .shared
                    .cond_space
                    .wait_timeout(state, CONSUMER_WAIT)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
        }
        self.stop_and_join();
        defx!();
    }

    /// Stop the consumer thread now, discarding queued items.
    /// Returns the count of discarded items.
    pub fn abort(&self) -> usize {
        defn!();
        self.stop_and_join();
        let mut state = self.shared.lock();
        let mut discarded: usize = 0;
        for slot in state.buffer.iter_mut() {
            if slot.take().is_some() {
                discarded += 1;
            }
        }
        state.size = 0;
        defx!("discarded {}", discarded);

        discarded
    }

    fn stop_and_join(&self) {
        {
            let mut state = self.shared.lock();
            state.stop = true;
        }
        self.shared.cond_item.notify_all();
        self.shared.cond_space.notify_all();
        let consumer = self
            .consumer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(consumer) = consumer {
            if consumer.join().is_err() {
                e_err!("ReactiveQueue consumer thread panicked");
            }
        }
    }
}

impl<T: Send + 'static> Drop for ReactiveQueue<T> {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop_and_join();
        }
    }
}

/// The consumer thread.
fn consumer_loop<T: Send + 'static>(shared: Arc<Shared<T>>) {
    defn!();
    loop {
        let (item, mut callback) = {
            let mut state = shared.lock();
            loop {
                if state.stop {
                    defx!("stop");
                    return;
                }
                if state.size > 0 && state.callback.is_some() {
                    break;
                }
                state = shared
                    .cond_item
                    .wait_timeout(state, CONSUMER_WAIT)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            let head: usize = state.head;
            let capacity: usize = state.buffer.len();
            let item: Option<T> = state.buffer[head].take();
            state.head = (head + 1) % capacity;
            (item, state.callback.take())
        };
        debug_assert!(item.is_some(), "empty slot at head of a non-empty queue");

        let mut panicked: bool = false;
        if let (Some(item), Some(callback)) = (item, callback.as_mut()) {
            panicked = catch_unwind(AssertUnwindSafe(|| callback(item))).is_err();
        }

        {
            let mut state = shared.lock();
            // a callback registered while this one ran takes precedence
            if state.callback.is_none() {
                state.callback = callback;
            }
            debug_assert_ge!(state.size, 1);
            state.size -= 1;
            debug_assert_le!(state.size, state.buffer.len());
            state.summary.consumed += 1;
            if panicked {
                state.summary.callback_panics += 1;
            }
        }
        if panicked {
            e_err!("ReactiveQueue callback panicked; continuing with the next item");
        }
        shared.cond_space.notify_all();
    }
}
