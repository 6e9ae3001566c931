//! Extension traits for attaching stacks to `Result` and `Option`

use super::types::{BoxError, Result, StackError};
use std::fmt;

/// Stack capture for fallible results
///
/// `Ok` values pass through untouched; only errors are wrapped.
pub trait ResultExt<T> {
    /// Wrap the error with the caller's stack
    fn with_stacks(self) -> Result<T>;

    /// Wrap the error and annotate the caller's frame with a message
    fn with_stacks_msg<D, F>(self, msg: F) -> Result<T>
    where
        D: fmt::Display,
        F: FnOnce() -> D;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<BoxError>,
{
    fn with_stacks(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(StackError::new(err)),
        }
    }

    fn with_stacks_msg<D, F>(self, msg: F) -> Result<T>
    where
        D: fmt::Display,
        F: FnOnce() -> D,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(StackError::annotate(err, format_args!("{}", msg()))),
        }
    }
}

/// Turn a missing value into a [`StackError`]
pub trait OptionExt<T> {
    /// Return the value, or a new error carrying `msg` and the caller's stack
    fn ok_or_stacks<D: fmt::Display>(self, msg: D) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_stacks<D: fmt::Display>(self, msg: D) -> Result<T> {
        match self {
            Some(value) => Ok(value),
            None => Err(StackError::msg(format_args!("{msg}"))),
        }
    }
}
