//! Error constructors and methods

use super::display::indent_lines;
use super::types::{BoxError, MessageError, StackError, StackErrorInner};
use crate::capture::{FrameSource, StackCapture, UNKNOWN_FRAME};
use log::trace;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

impl StackError {
    /// Wrap an error, capturing the caller's stack with the process-wide policy
    ///
    /// Wrapping a `StackError` returns that same wrapper: the first capture wins.
    #[must_use]
    pub fn new<E: Into<BoxError>>(err: E) -> Self {
        Self::wrap_with(&StackCapture::from_defaults(), err)
    }

    /// Wrap an error using an explicit capture policy
    #[must_use]
    pub fn wrap_with<S, E>(capture: &StackCapture<S>, err: E) -> Self
    where
        S: FrameSource,
        E: Into<BoxError>,
    {
        match Self::downcast(err.into()) {
            Ok(existing) => {
                trace!(
                    "Keeping existing stack capture ({} frames)",
                    existing.frames().len()
                );
                existing
            }
            Err(cause) => Self::from_parts(Arc::from(cause), capture.capture(0)),
        }
    }

    /// Create a new error from a formatted message and capture the caller's stack
    ///
    /// Lines after the first are indented by two spaces.
    #[must_use]
    pub fn msg(args: fmt::Arguments<'_>) -> Self {
        Self::msg_with(&StackCapture::from_defaults(), args)
    }

    /// Create a new message error using an explicit capture policy
    #[must_use]
    pub fn msg_with<S: FrameSource>(capture: &StackCapture<S>, args: fmt::Arguments<'_>) -> Self {
        let cause = MessageError::new(indent_lines(&args.to_string()));
        Self::from_parts(Arc::new(cause), capture.capture(0))
    }

    /// Attach a message to the frame of the current call site
    ///
    /// If `err` already carries at least as many frames as the current stack,
    /// the message is appended to existing frame `existing.len() - current.len()`
    /// and the same wrapper is returned. Otherwise a new wrapper is captured
    /// here with the message on its innermost frame.
    ///
    /// The frame is chosen by position only. When both captures were truncated
    /// at the depth bound they have equal length, so the message goes on frame
    /// 0 even when this call site is further out. With the default depth that
    /// holds for most live stacks.
    #[must_use]
    pub fn annotate<E: Into<BoxError>>(err: E, args: fmt::Arguments<'_>) -> Self {
        Self::annotate_with(&StackCapture::from_defaults(), err, args)
    }

    /// Annotate using an explicit capture policy
    #[must_use]
    pub fn annotate_with<S, E>(capture: &StackCapture<S>, err: E, args: fmt::Arguments<'_>) -> Self
    where
        S: FrameSource,
        E: Into<BoxError>,
    {
        let mut stack = capture.capture(0);
        if stack.is_empty() {
            stack.push(UNKNOWN_FRAME.to_string());
        }
        let annotation = format!(": {}", indent_lines(&args.to_string()));

        match Self::downcast(err.into()) {
            Ok(mut existing) if existing.frames().len() >= stack.len() => {
                let index = existing.frames().len() - stack.len();
                trace!(
                    "Annotating frame {index} of existing {} frame capture",
                    existing.frames().len()
                );
                Arc::make_mut(&mut existing.inner).frames[index].push_str(&annotation);
                existing
            }
            Ok(existing) => {
                trace!(
                    "Existing capture has {} frames, current site has {}; capturing again",
                    existing.frames().len(),
                    stack.len()
                );
                stack[0].push_str(&annotation);
                Self::from_parts(Arc::new(existing), stack)
            }
            Err(cause) => {
                stack[0].push_str(&annotation);
                Self::from_parts(Arc::from(cause), stack)
            }
        }
    }

    fn from_parts(cause: Arc<dyn StdError + Send + Sync + 'static>, frames: Vec<String>) -> Self {
        Self {
            inner: Arc::new(StackErrorInner { cause, frames }),
        }
    }

    /// The immediately wrapped error
    ///
    /// This is a `StackError` only when a shallower capture was re-wrapped by
    /// an annotation; use [`root_cause`](Self::root_cause) for the original fault.
    #[must_use]
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner.cause
    }

    /// The innermost error with every `StackError` layer removed
    #[must_use]
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        crate::cause(self)
    }

    /// Rendered call sites, innermost first
    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.inner.frames
    }

    /// Whether two handles share the same capture
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    /// View an arbitrary error as a `StackError`, if it is one
    #[must_use]
    pub fn downcast_ref<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Self> {
        err.downcast_ref::<Self>()
    }

    /// Take a boxed error back as a `StackError`, or return it untouched
    pub fn downcast(err: BoxError) -> std::result::Result<Self, BoxError> {
        err.downcast::<Self>().map(|boxed| *boxed)
    }
}
