//! Application layer of the console input logger.
//!
//! # Sub-modules
//!
//! - **`input_logger`** – The lifecycle owner: captures the console mode,
//!   switches the device into capture mode, runs the background reader
//!   thread and restores the original mode on stop.
//!
//! - **`event_channel`** – The bounded output channel: the reader's sending
//!   half (closed exactly once) and the cloneable receive-only view handed to
//!   consumers.
//!
//! Nothing in here calls the OS directly. All device access goes through the
//! [`ConsoleInput`](crate::infrastructure::console_input::ConsoleInput) trait.

pub mod event_channel;
pub mod input_logger;
