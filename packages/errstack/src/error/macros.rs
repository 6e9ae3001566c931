//! Macros for error creation and handling

/// Create a [`StackError`](crate::StackError) from a format string, capturing
/// the stack at the call site
///
/// ```
/// let err = errstack::new_with_stacks!("{}:{}", "a", 123);
/// assert_eq!(err.cause().to_string(), "a:123");
/// ```
#[macro_export]
macro_rules! new_with_stacks {
    ($($arg:tt)*) => {
        $crate::StackError::msg(::std::format_args!($($arg)*))
    };
}

/// Annotate an error with a formatted message at the call site
///
/// Accepts any error convertible into a boxed error, including a
/// [`StackError`](crate::StackError) from an inner call.
#[macro_export]
macro_rules! with_stacks_and_message {
    ($err:expr, $($arg:tt)*) => {
        $crate::StackError::annotate($err, ::std::format_args!($($arg)*))
    };
}

/// Return early with a new stack-carrying error
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return ::std::result::Result::Err($crate::new_with_stacks!($($arg)*).into())
    };
}

/// Return early with a new stack-carrying error unless a condition holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::bail!($($arg)*);
        }
    };
}
