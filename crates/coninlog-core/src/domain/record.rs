//! Raw input records as reported by the console device.

/// Opaque reference to the console input device.
///
/// Wraps the OS handle value as an integer so it is `Copy + Send` and can be
/// handed to the reader thread. The logger acquires it once and never closes
/// it: standard handles belong to the process and are reclaimed by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub usize);

/// Payload of a key-class input record (`KEY_EVENT_RECORD`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyRecord {
    /// Raw `bKeyDown` value. Any non-zero value means "pressed".
    pub key_down: i32,
    pub repeat_count: u16,
    pub virtual_key_code: u16,
    pub virtual_scan_code: u16,
    /// `uChar.UnicodeChar`.
    pub unicode_char: u16,
    pub control_key_state: u32,
}

/// One input record of any class.
///
/// Only [`RawInputRecord::Key`] carries a payload; the logger discards every
/// other class, so their contents are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputRecord {
    /// `KEY_EVENT` (0x0001).
    Key(KeyRecord),
    /// `MOUSE_EVENT` (0x0002).
    Mouse,
    /// `WINDOW_BUFFER_SIZE_EVENT` (0x0004).
    WindowBufferSize,
    /// `MENU_EVENT` (0x0008).
    Menu,
    /// `FOCUS_EVENT` (0x0010).
    Focus,
    /// Any type tag not listed above.
    Unknown(u16),
}

impl RawInputRecord {
    pub const KEY_EVENT: u16 = 0x0001;
    pub const MOUSE_EVENT: u16 = 0x0002;
    pub const WINDOW_BUFFER_SIZE_EVENT: u16 = 0x0004;
    pub const MENU_EVENT: u16 = 0x0008;
    pub const FOCUS_EVENT: u16 = 0x0010;

    /// Builds the record for a non-key type tag.
    ///
    /// Passing [`Self::KEY_EVENT`] yields `Unknown(KEY_EVENT)` since a key
    /// record cannot be built without its payload; use [`RawInputRecord::Key`].
    pub fn from_event_type(event_type: u16) -> Self {
        match event_type {
            Self::MOUSE_EVENT => Self::Mouse,
            Self::WINDOW_BUFFER_SIZE_EVENT => Self::WindowBufferSize,
            Self::MENU_EVENT => Self::Menu,
            Self::FOCUS_EVENT => Self::Focus,
            other => Self::Unknown(other),
        }
    }

    /// Returns the console type tag of this record.
    pub fn event_type(&self) -> u16 {
        match self {
            Self::Key(_) => Self::KEY_EVENT,
            Self::Mouse => Self::MOUSE_EVENT,
            Self::WindowBufferSize => Self::WINDOW_BUFFER_SIZE_EVENT,
            Self::Menu => Self::MENU_EVENT,
            Self::Focus => Self::FOCUS_EVENT,
            Self::Unknown(tag) => *tag,
        }
    }
}
