//! Console input device binding.
//!
//! On Windows, [`windows::WindowsConsole`] talks to the process's standard
//! input console through `GetStdHandle`, `GetConsoleMode`, `SetConsoleMode`
//! and `ReadConsoleInputW`. The read is blocking: the calling thread parks
//! inside the OS until the console has a record for it.
//!
//! # Testability
//!
//! The [`ConsoleInput`] trait lets the logger run against
//! [`scripted::ScriptedConsole`], an in-memory device whose reads block until
//! a test feeds them a record.

use std::sync::Arc;

use coninlog_core::{ConsoleMode, DeviceHandle, RawInputRecord};

pub mod scripted;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for console device operations.
///
/// Every variant is fatal for the operation that produced it; the logger
/// never retries a failed call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("console input handle unavailable: {0}")]
    HandleUnavailable(String),
    #[error("failed to read console mode: {0}")]
    GetModeFailed(String),
    #[error("failed to set console mode to {mode}: {reason}")]
    SetModeFailed { mode: ConsoleMode, reason: String },
    #[error("failed to read console input: {0}")]
    ReadFailed(String),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Operations the logger needs from the console input device.
///
/// The production implementation uses the Win32 console API; tests use
/// [`scripted::ScriptedConsole`] or the generated `MockConsoleInput`.
#[cfg_attr(test, mockall::automock)]
pub trait ConsoleInput: Send + Sync {
    /// Returns the handle of the console input device.
    fn input_handle(&self) -> Result<DeviceHandle, ConsoleError>;
    /// Reads the device's current input mode.
    fn mode(&self, handle: DeviceHandle) -> Result<ConsoleMode, ConsoleError>;
    /// Replaces the device's input mode.
    fn set_mode(&self, handle: DeviceHandle, mode: ConsoleMode) -> Result<(), ConsoleError>;
    /// Blocks until the device yields one input record.
    fn read_record(&self, handle: DeviceHandle) -> Result<RawInputRecord, ConsoleError>;
}

/// Returns the console binding for the current platform.
///
/// # Errors
///
/// Returns [`ConsoleError::UnsupportedPlatform`] everywhere except Windows.
#[cfg(target_os = "windows")]
pub fn platform_console() -> Result<Arc<dyn ConsoleInput>, ConsoleError> {
    Ok(Arc::new(windows::WindowsConsole::new()))
}

/// Returns the console binding for the current platform.
///
/// # Errors
///
/// Returns [`ConsoleError::UnsupportedPlatform`] everywhere except Windows.
#[cfg(not(target_os = "windows"))]
pub fn platform_console() -> Result<Arc<dyn ConsoleInput>, ConsoleError> {
    Err(ConsoleError::UnsupportedPlatform(format!(
        "console input capture requires Windows (running on {})",
        std::env::consts::OS
    )))
}
