//! Stack capture configuration
//!
//! Settings come from the environment (`ERRSTACK_MAX_DEPTH`,
//! `ERRSTACK_SYMBOLS`) or from JSON, and can be installed as the
//! process-wide defaults with [`StackConfig::apply`].

use crate::capture::{set_max_stack_depth, set_symbols_enabled, DEFAULT_MAX_STACK_DEPTH};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable holding the maximum capture depth
pub const MAX_DEPTH_ENV: &str = "ERRSTACK_MAX_DEPTH";

/// Environment variable toggling symbol names in frames
pub const SYMBOLS_ENV: &str = "ERRSTACK_SYMBOLS";

/// Stack capture settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Maximum number of real frames kept per capture
    pub max_stack_depth: usize,
    /// Whether frames include symbol names
    pub symbols: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            symbols: true,
        }
    }
}

impl StackConfig {
    /// Read settings from the process environment; unset variables keep defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(MAX_DEPTH_ENV) {
            config.max_stack_depth = value.trim().parse().map_err(|_| ConfigError::InvalidDepth {
                key: MAX_DEPTH_ENV.to_string(),
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(SYMBOLS_ENV) {
            config.symbols = parse_flag(&value).ok_or_else(|| ConfigError::InvalidFlag {
                key: SYMBOLS_ENV.to_string(),
                value: value.clone(),
            })?;
        }

        Ok(config)
    }

    /// Parse settings from JSON such as `{"max_stack_depth": 20}`
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Install these settings as the process-wide defaults
    pub fn apply(&self) {
        set_max_stack_depth(self.max_stack_depth);
        set_symbols_enabled(self.symbols);
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
