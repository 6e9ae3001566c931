//! Stack-carrying error wrapper
//!
//! Provides:
//! - `StackError`, an error plus the call sites captured when it was first wrapped
//! - Idempotent wrapping and per-frame message annotation
//! - Extension traits and macros for use with `?`
//! - Reporting helpers built on the log crate

pub mod constructors;
pub mod display;
pub mod extensions;
pub mod logging;
pub mod macros;
pub mod types;

// Re-export all public types and traits
pub use display::indent_lines;
pub use extensions::{OptionExt, ResultExt};
pub use logging::LoggingTransformer;
pub use types::{BoxError, ConfigError, MessageError, Result, StackError};
