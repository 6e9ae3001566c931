//! Tests for wrapping errors with captured stacks

use errstack::{cause, with_stacks, ResultExt, StackCapture, StackError};
use std::io;

fn origin() -> io::Error {
    io::Error::other("myerror")
}

#[test]
fn test_with_stacks_no_error() {
    assert!(with_stacks(None::<io::Error>).is_none());
}

#[test]
fn test_with_stacks_keeps_cause() {
    let wrapped = with_stacks(Some(origin())).expect("an error should stay an error");

    assert_eq!(wrapped.cause().to_string(), "myerror");
    assert!(wrapped.cause().downcast_ref::<io::Error>().is_some());
    assert!(!wrapped.frames().is_empty());
}

#[test]
fn test_with_stacks_is_idempotent() {
    let wrapped = StackError::new(origin());
    let again = with_stacks(Some(wrapped.clone())).expect("an error should stay an error");

    assert!(StackError::ptr_eq(&wrapped, &again));
    assert_eq!(wrapped.frames(), again.frames());

    // Boxing does not hide the wrapper either
    let boxed: errstack::BoxError = Box::new(wrapped.clone());
    assert!(StackError::ptr_eq(&wrapped, &StackError::new(boxed)));
}

#[test]
fn test_first_frame_is_the_wrap_site() {
    let wrapped = StackError::new(origin());
    let first = &wrapped.frames()[0];

    assert!(
        first.contains("with_stacks_test.rs:"),
        "first frame should point at this file: {first}"
    );
    assert!(
        first.contains("test_first_frame_is_the_wrap_site"),
        "first frame should name the calling test: {first}"
    );
}

#[test]
fn test_rendered_lines() {
    let wrapped = StackCapture::new(64).wrap(origin());
    let rendered = wrapped.to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "myerror");
    assert_eq!(lines.len(), wrapped.frames().len() + 1);
    for (line, frame) in lines[1..].iter().zip(wrapped.frames()) {
        assert_eq!(*line, format!("  at {frame}"));
    }
}

#[test]
fn test_source_is_the_cause() {
    let wrapped = StackError::new(origin());
    let source = std::error::Error::source(&wrapped).expect("wrapper should expose its cause");
    assert_eq!(source.to_string(), "myerror");
}

#[test]
fn test_result_ext_passes_ok_through() {
    let ok: Result<u32, io::Error> = Ok(7);
    assert_eq!(ok.with_stacks().expect("ok should stay ok"), 7);

    let err: Result<u32, io::Error> = Err(origin());
    let wrapped = err.with_stacks().expect_err("error should stay an error");
    assert_eq!(cause(&wrapped).to_string(), "myerror");
}

#[test]
fn test_question_mark_propagation() {
    fn parse(input: &str) -> errstack::Result<i64> {
        let value = input.parse::<i64>().with_stacks()?;
        Ok(value * 2)
    }

    assert_eq!(parse("21").expect("valid number"), 42);
    let err = parse("twenty").expect_err("invalid number");
    assert!(err.to_string().starts_with("invalid digit found in string"));
}

#[test]
fn test_anyhow_errors_can_be_wrapped() {
    let err = anyhow::anyhow!("from anyhow");
    let wrapped = StackError::new(err);
    assert_eq!(wrapped.root_cause().to_string(), "from anyhow");

    // And a wrapper converts back into anyhow
    let back: anyhow::Error = wrapped.into();
    assert!(back.downcast_ref::<StackError>().is_some());
}
