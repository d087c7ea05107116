//! Raw record → [`InputEvent`] translation.
//!
//! Both functions are pure and never fail. [`translate_key`] handles a record
//! already known to be key-class; [`translate_record`] accepts any record and
//! filters out everything that is not a key event.

use crate::domain::event::InputEvent;
use crate::domain::record::{KeyRecord, RawInputRecord};

/// Translates a key record into an [`InputEvent`].
///
/// `key_down` is coerced to a strict boolean (`0` → `false`, anything else →
/// `true`); every other field is copied verbatim.
pub fn translate_key(record: &KeyRecord) -> InputEvent {
    InputEvent {
        key_down: record.key_down != 0,
        repeat_count: record.repeat_count,
        virtual_key_code: record.virtual_key_code,
        virtual_scan_code: record.virtual_scan_code,
        character: record.unicode_char,
        control_key_state: record.control_key_state,
    }
}

/// Translates any input record, returning `None` for non-key records.
pub fn translate_record(record: &RawInputRecord) -> Option<InputEvent> {
    match record {
        RawInputRecord::Key(key) => Some(translate_key(key)),
        _ => None,
    }
}
