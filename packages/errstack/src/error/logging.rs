//! Structured reporting of stack-carrying errors
//!
//! Provides env_logger-based setup and helpers that report wrapped errors
//! through the standard log crate.

use super::types::StackError;
use log::{error, info, warn};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging setup and error reporting using `env_logger`
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at application startup)
    ///
    /// Configure levels via the `RUST_LOG` environment variable:
    /// - `RUST_LOG=errstack=debug` - report truncated captures
    /// - `RUST_LOG=errstack=trace` - also report every wrap/annotate decision
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            info!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    ///
    /// Use this in test modules to avoid initialization conflicts
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Report a wrapped error with its full trace
    pub fn log_stack_error(operation: &str, err: &StackError) {
        error!("{operation} failed: {err}");
    }

    /// Report only the root cause of an error, without frames
    pub fn log_cause(operation: &str, err: &(dyn std::error::Error + 'static)) {
        let cause = crate::cause(err);
        warn!(
            "{operation} failed: {cause} (error_type: {})",
            Self::cause_type(err)
        );
    }

    fn cause_type(err: &(dyn std::error::Error + 'static)) -> &'static str {
        if StackError::downcast_ref(err).is_some() {
            "wrapped"
        } else {
            "plain"
        }
    }
}
