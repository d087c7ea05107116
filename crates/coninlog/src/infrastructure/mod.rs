//! Infrastructure layer of the console input logger.
//!
//! Contains OS-facing adapters: the console input device binding and
//! file-system storage for the configuration.
//!
//! **Dependency rule**: this layer may depend on `coninlog_core`, but MUST
//! NOT import from `application`.

pub mod console_input;
pub mod storage;
