//! Console input mode bitmask.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

/// The console input mode, as read by `GetConsoleMode` and written by
/// `SetConsoleMode`.
///
/// Stored as the raw `u32` so a mode captured from the device can be written
/// back bit-for-bit, including flags this crate has no name for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsoleMode(pub u32);

impl ConsoleMode {
    pub const ENABLE_PROCESSED_INPUT: Self = Self(0x0001);
    pub const ENABLE_LINE_INPUT: Self = Self(0x0002);
    pub const ENABLE_ECHO_INPUT: Self = Self(0x0004);
    pub const ENABLE_WINDOW_INPUT: Self = Self(0x0008);
    pub const ENABLE_MOUSE_INPUT: Self = Self(0x0010);
    pub const ENABLE_INSERT_MODE: Self = Self(0x0020);
    pub const ENABLE_QUICK_EDIT_MODE: Self = Self(0x0040);
    pub const ENABLE_EXTENDED_FLAGS: Self = Self(0x0080);
    pub const ENABLE_VIRTUAL_TERMINAL_INPUT: Self = Self(0x0200);

    /// Mode applied while the logger is capturing: window + mouse + processed
    /// input. Line and echo input are off so every keystroke arrives as its
    /// own record.
    pub const CAPTURE: Self = Self(
        Self::ENABLE_WINDOW_INPUT.0 | Self::ENABLE_MOUSE_INPUT.0 | Self::ENABLE_PROCESSED_INPUT.0,
    );

    /// Returns the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ConsoleMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for ConsoleMode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for ConsoleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
