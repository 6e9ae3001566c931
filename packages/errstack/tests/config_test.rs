//! Tests for stack capture configuration

use errstack::config::{MAX_DEPTH_ENV, SYMBOLS_ENV};
use errstack::{ConfigError, StackCapture, StackConfig, DEFAULT_MAX_STACK_DEPTH};
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = StackConfig::from_lookup(lookup(&[])).expect("empty environment is valid");
    assert_eq!(config, StackConfig::default());
    assert_eq!(config.max_stack_depth, DEFAULT_MAX_STACK_DEPTH);
    assert!(config.symbols);
}

#[test]
fn test_from_lookup() {
    let config = StackConfig::from_lookup(lookup(&[(MAX_DEPTH_ENV, " 25 "), (SYMBOLS_ENV, "0")]))
        .expect("valid settings");
    assert_eq!(config.max_stack_depth, 25);
    assert!(!config.symbols);
}

#[test]
fn test_invalid_depth() {
    let err = StackConfig::from_lookup(lookup(&[(MAX_DEPTH_ENV, "-3")]))
        .expect_err("negative depth is rejected");
    assert!(matches!(err, ConfigError::InvalidDepth { .. }));
    assert!(err.to_string().contains(MAX_DEPTH_ENV));
}

#[test]
fn test_invalid_flag() {
    let err = StackConfig::from_lookup(lookup(&[(SYMBOLS_ENV, "sometimes")]))
        .expect_err("unknown flag is rejected");
    assert!(matches!(err, ConfigError::InvalidFlag { .. }));
}

#[test]
fn test_from_json() {
    let config = StackConfig::from_json(r#"{"max_stack_depth": 20}"#).expect("valid json");
    assert_eq!(config.max_stack_depth, 20);
    assert!(config.symbols);

    let err = StackConfig::from_json("{not json").expect_err("invalid json is rejected");
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_json_round_trip() {
    let config = StackConfig {
        max_stack_depth: 4,
        symbols: false,
    };
    let json = serde_json::to_string(&config).expect("config serializes");
    assert_eq!(StackConfig::from_json(&json).expect("valid json"), config);
}

#[test]
fn test_capture_from_config() {
    let config = StackConfig::from_json(r#"{"max_stack_depth": 2}"#).expect("valid json");
    let capture = StackCapture::from_config(&config);
    assert_eq!(capture.max_depth(), 2);
    assert!(capture.capture(0).len() <= 3);
}
