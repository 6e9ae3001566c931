//! Display and trait implementations for StackError

use super::types::StackError;
use std::fmt;

/// Prefix of every frame line in a rendered error
pub const FRAME_PREFIX: &str = "\n  at ";

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.cause)?;

        for frame in &self.inner.frames {
            write!(f, "{FRAME_PREFIX}{frame}")?;
        }

        Ok(())
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = &*self.inner.cause;
        Some(cause)
    }
}

/// Indent every line after the first by two spaces
///
/// Keeps multi-line messages readable once they sit inside a frame line.
#[must_use]
pub fn indent_lines(text: &str) -> String {
    text.replace('\n', "\n  ")
}
