//! # coninlog-core
//!
//! Shared library for the console input logger containing the typed event
//! model, the raw record model reported by the console, and the translator
//! that maps one into the other.
//!
//! This crate has zero dependencies on OS APIs. Everything that touches the
//! console device lives in the `coninlog` crate behind the `ConsoleInput`
//! trait.
//!
//! # Architecture overview (for beginners)
//!
//! A console on Windows delivers input as a stream of *input records*. Each
//! record carries a type tag (key, mouse, window resize, focus, menu) and a
//! payload. The logger only cares about key records:
//!
//! - **`domain`** – The value types: [`InputEvent`] (what consumers receive),
//!   [`KeyRecord`] / [`RawInputRecord`] (what the console reports),
//!   [`ConsoleMode`] (the input mode bitmask) and [`DeviceHandle`].
//!
//! - **`translate`** – Pure functions that turn a raw record into an
//!   [`InputEvent`], discarding every non-key record.

pub mod domain;
pub mod translate;

// Re-export the most-used types at the crate root so callers can write
// `coninlog_core::InputEvent` instead of `coninlog_core::domain::event::InputEvent`.
pub use domain::event::{ControlKeyState, InputEvent};
pub use domain::mode::ConsoleMode;
pub use domain::record::{DeviceHandle, KeyRecord, RawInputRecord};
pub use translate::{translate_key, translate_record};
