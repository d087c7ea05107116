//! InputLogger: owns the console mode, the background reader thread and the
//! output channel.
//!
//! # Lifecycle
//!
//! ```text
//!   new() ──► Created ──start()──► Running ──stop()──► Stopped (terminal)
//! ```
//!
//! - [`InputLogger::new`] acquires the device handle and captures the mode the
//!   console is in *before* the logger touches it. Nothing is read yet.
//! - [`InputLogger::start`] switches the console to [`ConsoleMode::CAPTURE`]
//!   and spawns the reader thread. It returns without waiting for input.
//! - [`InputLogger::stop`] clears the `enabled` flag, writes the captured mode
//!   back and closes the output channel.
//!
//! Out-of-order calls are errors, never panics: starting twice is
//! [`LoggerError::AlreadyStarted`], stopping before starting is
//! [`LoggerError::NotStarted`], and any call after stop is
//! [`LoggerError::AlreadyStopped`].
//!
//! # The reader thread and stop
//!
//! The reader parks inside the blocking console read and cannot be
//! interrupted. `stop` therefore does not wait for it: the thread may outlive
//! `stop` by at most one read. When that read returns, the reader sees
//! `enabled == false` and exits without sending. A reader blocked in a send
//! on a full channel is released by `stop` and exits at once, dropping that
//! event. An event whose send completed before `stop` is still delivered
//! ahead of end-of-stream; the channel itself is never written after it has
//! been closed.
//!
//! Callers that need to know the thread is gone can call
//! [`InputLogger::wait_for_reader`] with a timeout.
//!
//! # Device handle
//!
//! The handle is acquired once and never released. Standard console handles
//! belong to the process and are reclaimed by the OS at exit.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use coninlog_core::{translate_record, ConsoleMode, DeviceHandle};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use super::event_channel::{self, EventReceiver, EventSink, SendOutcome};
use crate::infrastructure::console_input::{ConsoleError, ConsoleInput};

/// Error type for logger operations.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// A console call failed. The logger never retries these.
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error("input logger is already running")]
    AlreadyStarted,
    #[error("input logger has not been started")]
    NotStarted,
    #[error("input logger has already been stopped")]
    AlreadyStopped,
    #[error("failed to spawn console reader thread: {0}")]
    ReaderSpawnFailed(String),
    #[error("console reader thread panicked")]
    ReaderPanicked,
}

/// Where the logger is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Running,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Why the reader thread ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderExit {
    /// The reader observed that the logger was stopped, either after a read
    /// or while blocked on a full channel.
    Stopped,
    /// The blocking read failed. The output channel was closed so consumers
    /// see end-of-stream; the console mode is still restored by `stop`.
    Failed(ConsoleError),
}

struct ReaderHandle {
    thread: Option<JoinHandle<()>>,
    done: Receiver<ReaderExit>,
    exit: Option<ReaderExit>,
}

/// Captures key events from the console and republishes them on a bounded
/// channel.
pub struct InputLogger {
    console: Arc<dyn ConsoleInput>,
    handle: DeviceHandle,
    original_mode: ConsoleMode,
    capture_mode: ConsoleMode,
    enabled: Arc<AtomicBool>,
    state: Mutex<LifecycleState>,
    sink: Arc<EventSink>,
    receiver: EventReceiver,
    reader: Mutex<Option<ReaderHandle>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InputLogger {
    /// Creates a logger whose output channel buffers up to `buffer_size`
    /// events. A size of `0` makes every send wait for a consumer.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Console`] if the device handle or its current
    /// mode cannot be obtained.
    pub fn new(console: Arc<dyn ConsoleInput>, buffer_size: usize) -> Result<Self, LoggerError> {
        let handle = console.input_handle()?;
        let original_mode = console.mode(handle)?;
        let (sink, receiver) = event_channel::bounded(buffer_size);

        debug!(?handle, %original_mode, buffer_size, "input logger created");

        Ok(Self {
            console,
            handle,
            original_mode,
            capture_mode: ConsoleMode::CAPTURE,
            enabled: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(LifecycleState::Created),
            sink: Arc::new(sink),
            receiver,
            reader: Mutex::new(None),
        })
    }

    /// Returns the receive-only end of the output channel.
    pub fn channel(&self) -> EventReceiver {
        self.receiver.clone()
    }

    /// Switches the console to capture mode and launches the reader thread.
    ///
    /// # Errors
    ///
    /// - [`LoggerError::AlreadyStarted`] / [`LoggerError::AlreadyStopped`] if
    ///   the logger is not in the `Created` state.
    /// - [`LoggerError::Console`] if the capture mode cannot be applied. The
    ///   logger stays in `Created`.
    /// - [`LoggerError::ReaderSpawnFailed`] if the thread cannot be spawned.
    ///   The original mode is written back and the logger stays in `Created`.
    pub fn start(&self) -> Result<(), LoggerError> {
        let mut state = lock(&self.state);
        match *state {
            LifecycleState::Created => {}
            LifecycleState::Running => return Err(LoggerError::AlreadyStarted),
            LifecycleState::Stopped => return Err(LoggerError::AlreadyStopped),
        }

        self.enabled.store(true, Ordering::SeqCst);
        if let Err(e) = self.console.set_mode(self.handle, self.capture_mode) {
            self.enabled.store(false, Ordering::SeqCst);
            return Err(e.into());
        }
        debug!(mode = %self.capture_mode, "console switched to capture mode");

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let console = Arc::clone(&self.console);
        let enabled = Arc::clone(&self.enabled);
        let sink = Arc::clone(&self.sink);
        let handle = self.handle;

        let spawned = thread::Builder::new()
            .name("coninlog-reader".to_string())
            .spawn(move || {
                let exit = run_reader(console.as_ref(), handle, &enabled, &sink);
                debug!(?exit, "console reader exited");
                // Nobody may be waiting for the signal; that is fine.
                let _ = done_tx.send(exit);
            });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.enabled.store(false, Ordering::SeqCst);
                if let Err(restore) = self.console.set_mode(self.handle, self.original_mode) {
                    error!("failed to restore console mode after spawn failure: {restore}");
                }
                return Err(LoggerError::ReaderSpawnFailed(e.to_string()));
            }
        };

        *lock(&self.reader) = Some(ReaderHandle {
            thread: Some(thread),
            done: done_rx,
            exit: None,
        });
        *state = LifecycleState::Running;
        info!("input logger started");
        Ok(())
    }

    /// Stops capturing, restores the original console mode and closes the
    /// output channel.
    ///
    /// Returns once the mode has been written back and the channel closed; it
    /// does not wait for the reader thread (see the module docs).
    ///
    /// # Errors
    ///
    /// - [`LoggerError::NotStarted`] / [`LoggerError::AlreadyStopped`] if the
    ///   logger is not running.
    /// - [`LoggerError::Console`] if the original mode cannot be restored. The
    ///   channel is closed and the logger is `Stopped` regardless, so
    ///   consumers are never left waiting on a dead logger.
    pub fn stop(&self) -> Result<(), LoggerError> {
        let mut state = lock(&self.state);
        match *state {
            LifecycleState::Running => {}
            LifecycleState::Created => return Err(LoggerError::NotStarted),
            LifecycleState::Stopped => return Err(LoggerError::AlreadyStopped),
        }

        self.enabled.store(false, Ordering::SeqCst);
        let restored = self.console.set_mode(self.handle, self.original_mode);
        match &restored {
            Ok(()) => debug!(mode = %self.original_mode, "console mode restored"),
            Err(e) => error!("failed to restore console mode: {e}"),
        }
        self.sink.close();
        *state = LifecycleState::Stopped;
        info!("input logger stopped");

        restored.map_err(LoggerError::from)
    }

    /// Waits up to `timeout` for the reader thread to finish and returns why
    /// it ended, or `None` if it is still running.
    ///
    /// Once the reader has finished, every later call returns the same exit
    /// immediately.
    ///
    /// # Errors
    ///
    /// - [`LoggerError::NotStarted`] if no reader was ever launched.
    /// - [`LoggerError::ReaderPanicked`] if the thread died without reporting.
    pub fn wait_for_reader(&self, timeout: Duration) -> Result<Option<ReaderExit>, LoggerError> {
        let mut guard = lock(&self.reader);
        let reader = guard.as_mut().ok_or(LoggerError::NotStarted)?;
        if let Some(exit) = &reader.exit {
            return Ok(Some(exit.clone()));
        }

        match reader.done.recv_timeout(timeout) {
            Ok(exit) => {
                if let Some(thread) = reader.thread.take() {
                    thread.join().map_err(|_| LoggerError::ReaderPanicked)?;
                }
                reader.exit = Some(exit.clone());
                Ok(Some(exit))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(thread) = reader.thread.take() {
                    let _ = thread.join();
                }
                Err(LoggerError::ReaderPanicked)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *lock(&self.state)
    }

    /// Returns `true` between a successful `start` and `stop`.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// The console mode captured at construction.
    pub fn original_mode(&self) -> ConsoleMode {
        self.original_mode
    }

    /// The console mode applied while running.
    pub fn capture_mode(&self) -> ConsoleMode {
        self.capture_mode
    }

    /// The console input handle acquired at construction.
    pub fn device_handle(&self) -> DeviceHandle {
        self.handle
    }
}

impl fmt::Debug for InputLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputLogger")
            .field("handle", &self.handle)
            .field("original_mode", &self.original_mode)
            .field("capture_mode", &self.capture_mode)
            .field("state", &self.state())
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl Drop for InputLogger {
    /// A logger dropped while running still hands the console back in the
    /// mode it found it in.
    fn drop(&mut self) {
        if self.state() == LifecycleState::Running {
            warn!("input logger dropped while running; stopping");
            if let Err(e) = self.stop() {
                error!("stop on drop failed: {e}");
            }
        }
    }
}

/// Body of the reader thread. Runs until the logger stops or a read fails.
fn run_reader(
    console: &dyn ConsoleInput,
    handle: DeviceHandle,
    enabled: &AtomicBool,
    sink: &EventSink,
) -> ReaderExit {
    loop {
        let record = match console.read_record(handle) {
            Ok(record) => record,
            Err(e) => {
                error!("console read failed, reader exiting: {e}");
                sink.close();
                return ReaderExit::Failed(e);
            }
        };

        if !enabled.load(Ordering::SeqCst) {
            warn!(event_type = record.event_type(), "record read after stop discarded");
            return ReaderExit::Stopped;
        }

        let Some(event) = translate_record(&record) else {
            trace!(event_type = record.event_type(), "non-key record discarded");
            continue;
        };

        match sink.send(event) {
            SendOutcome::Delivered => trace!(%event, "event delivered"),
            SendOutcome::Closed => {
                warn!(%event, "output channel closed; dropping event");
                return ReaderExit::Stopped;
            }
        }
    }
}
