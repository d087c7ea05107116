//! Bounded output channel between the reader thread and consumers.
//!
//! Built on `crossbeam_channel::bounded`, so a capacity of `0` gives
//! rendezvous semantics: the reader blocks in [`EventSink::send`] until a
//! consumer receives. Receivers are multi-consumer; every clone of an
//! [`EventReceiver`] waits independently.
//!
//! The sending half lives in an [`EventSink`] slot that is emptied exactly
//! once by [`EventSink::close`]. The reader clones the sender out of the slot
//! for each send, so it can never send on a channel that has been closed: once
//! the slot is empty it reports [`SendOutcome::Closed`] instead. Closing also
//! wakes a send that is blocked on a full channel.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender, TrySendError};

pub use crossbeam_channel::{RecvTimeoutError, TryRecvError};

use coninlog_core::InputEvent;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Creates a bounded channel holding at most `capacity` undelivered events.
pub(crate) fn bounded(capacity: usize) -> (EventSink, EventReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    // Never carries a message; dropping the sender disconnects `closed`.
    let (close_tx, close_rx) = crossbeam_channel::bounded(0);
    (
        EventSink {
            open: Mutex::new(Some(OpenSink {
                events: tx,
                _close_signal: close_tx,
            })),
            closed: close_rx,
        },
        EventReceiver { inner: rx },
    )
}

/// Result of offering one event to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendOutcome {
    /// The event was queued (or handed to a waiting consumer).
    Delivered,
    /// The channel was closed before or while the send was pending, or no
    /// receiver is left. The event was dropped.
    Closed,
}

#[derive(Debug)]
struct OpenSink {
    events: Sender<InputEvent>,
    _close_signal: Sender<()>,
}

/// Sending half of the output channel.
#[derive(Debug)]
pub(crate) struct EventSink {
    open: Mutex<Option<OpenSink>>,
    closed: Receiver<()>,
}

impl EventSink {
    /// Offers `event` to the channel, blocking while it is full.
    ///
    /// The slot lock is released before blocking, so [`close`](Self::close)
    /// never waits on a full channel. A send that is still blocked when
    /// `close` runs returns [`SendOutcome::Closed`]. A send that completed
    /// before `close` is seen by consumers ahead of end-of-stream.
    pub(crate) fn send(&self, event: InputEvent) -> SendOutcome {
        let Some(sender) = lock(&self.open).as_ref().map(|open| open.events.clone()) else {
            return SendOutcome::Closed;
        };

        match sender.try_send(event) {
            Ok(()) => return SendOutcome::Delivered,
            Err(TrySendError::Disconnected(_)) => return SendOutcome::Closed,
            Err(TrySendError::Full(_)) => {}
        }

        select! {
            send(sender, event) -> sent => match sent {
                Ok(()) => SendOutcome::Delivered,
                Err(_) => SendOutcome::Closed,
            },
            recv(self.closed) -> _ => SendOutcome::Closed,
        }
    }

    /// Closes the channel and releases any blocked send. Returns `false` if
    /// it was already closed.
    pub(crate) fn close(&self) -> bool {
        lock(&self.open).take().is_some()
    }

    pub(crate) fn is_closed(&self) -> bool {
        lock(&self.open).is_none()
    }
}

/// Receive-only view of the logger's output channel.
///
/// Cheap to clone; every clone drains the same queue, so each event is
/// delivered to exactly one consumer. Clones never block one another: a
/// consumer parked in [`recv`](Self::recv) does not delay another clone's
/// [`try_recv`](Self::try_recv) or [`recv_timeout`](Self::recv_timeout).
/// Channel closure is end-of-stream: `recv` keeps returning buffered events
/// after the logger stops, then returns `None`.
#[derive(Debug, Clone)]
pub struct EventReceiver {
    inner: Receiver<InputEvent>,
}

impl EventReceiver {
    /// Blocks until an event arrives. Returns `None` once the channel is
    /// closed and drained.
    pub fn recv(&self) -> Option<InputEvent> {
        self.inner.recv().ok()
    }

    /// Returns a buffered event without blocking.
    ///
    /// # Errors
    ///
    /// [`TryRecvError::Empty`] if nothing is buffered,
    /// [`TryRecvError::Disconnected`] once the channel is closed and drained.
    pub fn try_recv(&self) -> Result<InputEvent, TryRecvError> {
        self.inner.try_recv()
    }

    /// Blocks for at most `timeout` waiting for an event.
    ///
    /// # Errors
    ///
    /// [`RecvTimeoutError::Timeout`] if nothing arrived in time,
    /// [`RecvTimeoutError::Disconnected`] once the channel is closed and drained.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.inner.recv_timeout(timeout)
    }

    /// Iterates over events until end-of-stream.
    pub fn iter(&self) -> impl Iterator<Item = InputEvent> + '_ {
        self.inner.iter()
    }
}
