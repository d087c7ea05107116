//! Domain types for the console input logger.
//!
//! Nothing in here performs I/O. The types describe what the console reports
//! ([`record`]), how the console is configured ([`mode`]) and what the logger
//! hands to its consumers ([`event`]).

pub mod event;
pub mod mode;
pub mod record;
