//! Core error types and definitions

use std::sync::Arc;
use thiserror::Error;

/// Boxed, thread-safe error accepted by every wrapping entry point
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error together with the call stack captured where it was first wrapped
///
/// The wrapper is a cheap handle: cloning shares the captured frames.
/// Annotating a shared wrapper copies it first, so clones never observe
/// annotations made through another handle.
#[derive(Debug, Clone)]
pub struct StackError {
    pub(super) inner: Arc<StackErrorInner>,
}

#[derive(Debug, Clone)]
pub(super) struct StackErrorInner {
    /// The wrapped error
    pub cause: Arc<dyn std::error::Error + Send + Sync + 'static>,
    /// Rendered call sites, innermost first
    pub frames: Vec<String>,
}

/// Plain message error created by [`new_with_stacks!`](crate::new_with_stacks)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MessageError(String);

impl MessageError {
    /// Create a message error from already formatted text
    pub fn new<S: Into<String>>(msg: S) -> Self {
        Self(msg.into())
    }

    /// The message text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors raised while reading stack capture configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A depth setting was not a non-negative integer
    #[error("invalid value {value:?} for {key}: expected a non-negative integer")]
    InvalidDepth {
        /// Setting name
        key: String,
        /// Rejected value
        value: String,
    },

    /// A flag setting was not a boolean
    #[error("invalid value {value:?} for {key}: expected true/false or 1/0")]
    InvalidFlag {
        /// Setting name
        key: String,
        /// Rejected value
        value: String,
    },

    /// JSON configuration could not be parsed
    #[error("invalid stack configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using [`StackError`]
pub type Result<T> = std::result::Result<T, StackError>;
