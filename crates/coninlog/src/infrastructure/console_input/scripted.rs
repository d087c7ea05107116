//! Scripted console device for tests and demos.
//!
//! # Why a scripted console?
//!
//! The real console binding blocks inside `ReadConsoleInputW` until someone
//! presses a key, and changes the mode of the terminal running the tests.
//! `ScriptedConsole` keeps the same blocking shape without a terminal:
//!
//! - [`read_record`](ConsoleInput::read_record) parks the calling thread until
//!   the test feeds a record with [`push`](ScriptedConsole::push) (or an error
//!   with [`push_error`](ScriptedConsole::push_error)).
//! - Every [`set_mode`](ConsoleInput::set_mode) call is recorded so tests can
//!   assert exactly which modes were applied, and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let console = Arc::new(ScriptedConsole::new(ConsoleMode(0x01F7)));
//! let logger = InputLogger::new(console.clone(), 10)?;
//! logger.start()?;
//! console.push_key(KeyRecord { key_down: 1, virtual_key_code: 0x41, ..Default::default() });
//! let event = logger.channel().recv();
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use coninlog_core::{ConsoleMode, DeviceHandle, KeyRecord, RawInputRecord};

use super::{ConsoleError, ConsoleInput};

type Feed = Result<RawInputRecord, ConsoleError>;

/// Handle value reported by every scripted console.
pub const SCRIPTED_HANDLE: DeviceHandle = DeviceHandle(0x5C);

/// An in-memory [`ConsoleInput`] whose reads are fed by the test.
#[derive(Debug)]
pub struct ScriptedConsole {
    current_mode: Mutex<ConsoleMode>,
    mode_writes: Mutex<Vec<ConsoleMode>>,
    feed_tx: Mutex<Option<Sender<Feed>>>,
    feed_rx: Mutex<Receiver<Feed>>,
    reads_served: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedConsole {
    /// Creates a console whose mode starts out as `initial_mode`.
    pub fn new(initial_mode: ConsoleMode) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            current_mode: Mutex::new(initial_mode),
            mode_writes: Mutex::new(Vec::new()),
            feed_tx: Mutex::new(Some(tx)),
            feed_rx: Mutex::new(rx),
            reads_served: AtomicUsize::new(0),
        }
    }

    /// Queues a record for the next blocked (or future) read.
    ///
    /// Silently ignored after [`close_feed`](Self::close_feed).
    pub fn push(&self, record: RawInputRecord) {
        self.feed(Ok(record));
    }

    /// Queues a key record.
    pub fn push_key(&self, key: KeyRecord) {
        self.push(RawInputRecord::Key(key));
    }

    /// Makes the next read fail with `error`.
    pub fn push_error(&self, error: ConsoleError) {
        self.feed(Err(error));
    }

    /// Ends the feed: every pending and future read fails with
    /// [`ConsoleError::ReadFailed`] once the queued records are consumed.
    pub fn close_feed(&self) {
        lock(&self.feed_tx).take();
    }

    /// Returns the mode most recently written (or the initial mode).
    pub fn current_mode(&self) -> ConsoleMode {
        *lock(&self.current_mode)
    }

    /// Returns every mode passed to `set_mode`, oldest first.
    pub fn mode_writes(&self) -> Vec<ConsoleMode> {
        lock(&self.mode_writes).clone()
    }

    /// Returns how many reads have returned (successfully or not).
    pub fn reads_served(&self) -> usize {
        self.reads_served.load(Ordering::SeqCst)
    }

    fn feed(&self, item: Feed) {
        if let Some(tx) = lock(&self.feed_tx).as_ref() {
            // The receiver lives in `self`, so this cannot fail.
            let _ = tx.send(item);
        }
    }
}

impl ConsoleInput for ScriptedConsole {
    fn input_handle(&self) -> Result<DeviceHandle, ConsoleError> {
        Ok(SCRIPTED_HANDLE)
    }

    fn mode(&self, _handle: DeviceHandle) -> Result<ConsoleMode, ConsoleError> {
        Ok(self.current_mode())
    }

    fn set_mode(&self, _handle: DeviceHandle, mode: ConsoleMode) -> Result<(), ConsoleError> {
        *lock(&self.current_mode) = mode;
        lock(&self.mode_writes).push(mode);
        Ok(())
    }

    fn read_record(&self, _handle: DeviceHandle) -> Result<RawInputRecord, ConsoleError> {
        let next = lock(&self.feed_rx).recv();
        self.reads_served.fetch_add(1, Ordering::SeqCst);
        next.unwrap_or_else(|_| Err(ConsoleError::ReadFailed("scripted feed closed".to_string())))
    }
}
