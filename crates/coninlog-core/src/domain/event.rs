//! The typed key event handed to consumers of the logger.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One physical key transition reported by the console.
///
/// Produced once per key-class input record. Every field except `key_down`
/// is copied verbatim from the raw record, so the widths here match the
/// console's own `KEY_EVENT_RECORD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEvent {
    /// `true` on key press, `false` on key release.
    pub key_down: bool,
    /// How many times the keystroke was auto-repeated while the key was held.
    pub repeat_count: u16,
    /// Device-independent virtual key code (e.g. `0x41` for `A`).
    pub virtual_key_code: u16,
    /// Device-specific hardware scan code.
    pub virtual_scan_code: u16,
    /// Translated UTF-16 code unit, `0` when the key produces no character.
    pub character: u16,
    /// Raw modifier/lock bitmask. See [`ControlKeyState`] for the bit names.
    pub control_key_state: u32,
}

impl InputEvent {
    /// Decodes [`character`](Self::character) as a Unicode scalar.
    ///
    /// Returns `None` for non-printable keys (code unit `0`) and for lone
    /// surrogate halves, which the console emits one per record for
    /// characters outside the Basic Multilingual Plane.
    pub fn as_char(&self) -> Option<char> {
        if self.character == 0 {
            return None;
        }
        char::from_u32(u32::from(self.character))
    }

    /// Returns the modifier bitmask wrapped in its named-flag view.
    pub fn modifiers(&self) -> ControlKeyState {
        ControlKeyState(self.control_key_state)
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.key_down { "down" } else { "up" };
        write!(
            f,
            "{direction:<4} vk=0x{:02X} scan=0x{:02X} repeat={} ctrl=0x{:08X}",
            self.virtual_key_code, self.virtual_scan_code, self.repeat_count, self.control_key_state,
        )?;
        match self.as_char() {
            Some(c) if !c.is_control() => write!(f, " char={c:?}"),
            _ => Ok(()),
        }
    }
}

/// Named view over the console's `dwControlKeyState` bitmask.
///
/// The logger never rewrites these bits; this type only gives them names for
/// display and for consumers that want to test a modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ControlKeyState(pub u32);

impl ControlKeyState {
    pub const RIGHT_ALT_PRESSED: u32 = 0x0001;
    pub const LEFT_ALT_PRESSED: u32 = 0x0002;
    pub const RIGHT_CTRL_PRESSED: u32 = 0x0004;
    pub const LEFT_CTRL_PRESSED: u32 = 0x0008;
    pub const SHIFT_PRESSED: u32 = 0x0010;
    pub const NUMLOCK_ON: u32 = 0x0020;
    pub const SCROLLLOCK_ON: u32 = 0x0040;
    pub const CAPSLOCK_ON: u32 = 0x0080;
    pub const ENHANCED_KEY: u32 = 0x0100;

    /// Returns `true` if every bit in `flags` is set.
    pub fn contains(&self, flags: u32) -> bool {
        self.0 & flags == flags
    }

    /// Returns `true` if either Ctrl key is held.
    pub fn ctrl(&self) -> bool {
        self.0 & (Self::LEFT_CTRL_PRESSED | Self::RIGHT_CTRL_PRESSED) != 0
    }

    /// Returns `true` if either Alt key is held.
    pub fn alt(&self) -> bool {
        self.0 & (Self::LEFT_ALT_PRESSED | Self::RIGHT_ALT_PRESSED) != 0
    }

    /// Returns `true` if Shift is held.
    pub fn shift(&self) -> bool {
        self.0 & Self::SHIFT_PRESSED != 0
    }
}
