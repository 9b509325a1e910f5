//! Server configuration from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `FLOWCHAIN_PORT` | `3000` | listen port |
//! | `FLOWCHAIN_POLICY` | `free` | `free` or `fixed` link policy |
//! | `FLOWCHAIN_INITIAL_VALUE` | `2` | value fed into the chain |
//! | `FLOWCHAIN_WIRED` | `false` | pre-wire the seed in the fixed order |

use flowchain_core::seed::DEFAULT_INITIAL_VALUE;
use flowchain_core::LinkPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub policy: LinkPolicy,
    pub initial_value: f64,
    /// Start with the seed wired `SOURCE -> 1 -> 2 -> 4 -> 5 -> 3 -> FINAL`.
    pub wired: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            policy: LinkPolicy::Free,
            initial_value: DEFAULT_INITIAL_VALUE,
            wired: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source. Unset variables take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(value) = lookup("FLOWCHAIN_PORT") {
            config.port = value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "FLOWCHAIN_PORT",
                expected: "a port number",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("FLOWCHAIN_POLICY") {
            config.policy = value.parse().map_err(|_| ConfigError::Invalid {
                var: "FLOWCHAIN_POLICY",
                expected: "'free' or 'fixed'",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("FLOWCHAIN_INITIAL_VALUE") {
            config.initial_value = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ConfigError::Invalid {
                    var: "FLOWCHAIN_INITIAL_VALUE",
                    expected: "a finite number",
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup("FLOWCHAIN_WIRED") {
            config.wired = parse_flag(&value).ok_or_else(|| ConfigError::Invalid {
                var: "FLOWCHAIN_WIRED",
                expected: "true or false",
                value: value.clone(),
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
