//! Errors that remember where they were first observed
//!
//! This crate wraps arbitrary errors in a [`StackError`] that carries the call
//! stack captured at the moment the error was first wrapped, and lets each
//! layer of the call chain annotate its own frame with a message as the error
//! propagates upward:
//!
//! ```
//! use errstack::with_stacks_and_message;
//!
//! fn read_config() -> errstack::Result<String> {
//!     let err = std::io::Error::other("permission denied");
//!     Err(with_stacks_and_message!(err, "reading {}", "app.toml"))
//! }
//!
//! let err = read_config().unwrap_err();
//! assert_eq!(err.root_cause().to_string(), "permission denied");
//! assert!(err.frames()[0].ends_with(": reading app.toml"));
//! ```
//!
//! Wrapping is idempotent: wrapping a `StackError` returns it unchanged, so the
//! frames always describe where the fault was first seen. Rendering an error
//! prints the cause followed by one `  at <frame>` line per captured frame.

pub mod capture;
pub mod config;
pub mod error;

pub use capture::{
    max_stack_depth, set_max_stack_depth, set_symbols_enabled, symbols_enabled, BacktraceSource,
    Frame, FrameSource, StackCapture, StaticFrames, DEFAULT_MAX_STACK_DEPTH, TRUNCATION_MARKER,
};
pub use config::StackConfig;
pub use error::*;

use std::error::Error as StdError;
use std::fmt;

/// Wrap an error with the caller's stack; `None` stays `None`
///
/// An error that is already a [`StackError`] is returned unchanged.
#[must_use]
pub fn with_stacks<E: Into<BoxError>>(err: Option<E>) -> Option<StackError> {
    // `Option::map` would put a core frame between the caller and the capture
    match err {
        Some(err) => Some(StackError::new(err)),
        None => None,
    }
}

/// Annotate an error at the caller's frame; `None` stays `None`
///
/// See [`StackError::annotate`] for how the frame is chosen.
#[must_use]
pub fn with_stacks_and_message<E: Into<BoxError>>(
    err: Option<E>,
    args: fmt::Arguments<'_>,
) -> Option<StackError> {
    match err {
        Some(err) => Some(StackError::annotate(err, args)),
        None => None,
    }
}

/// Strip every [`StackError`] layer and return the original error
///
/// Errors that were never wrapped are returned as they are.
#[must_use]
pub fn cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(wrapper) = StackError::downcast_ref(current) {
        let inner: &(dyn StdError + 'static) = wrapper.cause();
        current = inner;
    }
    current
}
