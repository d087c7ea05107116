//! Win32 console input binding.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::ffi::c_void;

use coninlog_core::{ConsoleMode, DeviceHandle, KeyRecord, RawInputRecord};
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Console::{
    GetConsoleMode, GetStdHandle, ReadConsoleInputW, SetConsoleMode, CONSOLE_MODE, INPUT_RECORD,
    KEY_EVENT, STD_INPUT_HANDLE,
};

use super::{ConsoleError, ConsoleInput};

/// [`ConsoleInput`] backed by the process's standard input console.
#[derive(Debug, Default)]
pub struct WindowsConsole;

impl WindowsConsole {
    pub fn new() -> Self {
        Self
    }
}

fn to_handle(handle: DeviceHandle) -> HANDLE {
    HANDLE(handle.0 as *mut c_void)
}

impl ConsoleInput for WindowsConsole {
    fn input_handle(&self) -> Result<DeviceHandle, ConsoleError> {
        // SAFETY: GetStdHandle has no preconditions; it only reads the process parameter block.
        let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) }
            .map_err(|e| ConsoleError::HandleUnavailable(e.to_string()))?;
        // A process without an attached console gets a NULL handle and no error.
        if handle.is_invalid() || handle.0.is_null() {
            return Err(ConsoleError::HandleUnavailable(
                "process has no console input attached".to_string(),
            ));
        }
        Ok(DeviceHandle(handle.0 as usize))
    }

    fn mode(&self, handle: DeviceHandle) -> Result<ConsoleMode, ConsoleError> {
        let mut mode = CONSOLE_MODE(0);
        // SAFETY: `mode` is a valid, writable CONSOLE_MODE on the stack.
        unsafe { GetConsoleMode(to_handle(handle), &mut mode) }
            .map_err(|e| ConsoleError::GetModeFailed(e.to_string()))?;
        Ok(ConsoleMode(mode.0))
    }

    fn set_mode(&self, handle: DeviceHandle, mode: ConsoleMode) -> Result<(), ConsoleError> {
        // SAFETY: SetConsoleMode only reads its by-value arguments.
        unsafe { SetConsoleMode(to_handle(handle), CONSOLE_MODE(mode.bits())) }.map_err(|e| {
            ConsoleError::SetModeFailed {
                mode,
                reason: e.to_string(),
            }
        })
    }

    fn read_record(&self, handle: DeviceHandle) -> Result<RawInputRecord, ConsoleError> {
        let mut records = [INPUT_RECORD::default()];
        let mut read = 0u32;
        // SAFETY: `records` is a writable one-element buffer and `read` a writable u32.
        // The call blocks until at least one record is available.
        unsafe { ReadConsoleInputW(to_handle(handle), &mut records, &mut read) }
            .map_err(|e| ConsoleError::ReadFailed(e.to_string()))?;
        if read == 0 {
            return Err(ConsoleError::ReadFailed(
                "ReadConsoleInputW returned without a record".to_string(),
            ));
        }

        let record = &records[0];
        if u32::from(record.EventType) != KEY_EVENT {
            return Ok(RawInputRecord::from_event_type(record.EventType));
        }

        // SAFETY: EventType == KEY_EVENT means `KeyEvent` is the initialised union arm,
        // and `UnicodeChar` is the arm ReadConsoleInputW (the W variant) fills.
        let (key, unicode_char) = unsafe {
            let key = record.Event.KeyEvent;
            (key, key.uChar.UnicodeChar)
        };
        Ok(RawInputRecord::Key(KeyRecord {
            key_down: key.bKeyDown.0,
            repeat_count: key.wRepeatCount,
            virtual_key_code: key.wVirtualKeyCode,
            virtual_scan_code: key.wVirtualScanCode,
            unicode_char,
            control_key_state: key.dwControlKeyState,
        }))
    }
}
