// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Key/value access to the configuration the executor reads at startup.
//!
//! The process environment is the usual source, but tests (and embedders) can supply their own
//! values through [`MapEnvironment`] or layer several sources with [`CompositeEnvironment`].

mod composite;
mod map;

pub use composite::CompositeEnvironment;
pub use map::MapEnvironment;

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, EnvError> {
        match self.get(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" | "enable" => Ok(true),
                "false" | "0" | "no" | "off" | "disabled" | "disable" => Ok(false),
                _ => Err(EnvError::InvalidBoolean {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }

    fn get_or_else(&self, key: &str, default_value: &str) -> String {
        self.get(key).unwrap_or(default_value.to_string())
    }

    /// Non-negative integer setting, `None` when unset.
    fn get_u64(&self, key: &str) -> Result<Option<u64>, EnvError> {
        self.get(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| EnvError::InvalidNumber {
                        key: key.to_string(),
                        value,
                    })
            })
            .transpose()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid value for {key}: {value}. Expected a non-negative integer")]
    InvalidNumber { key: String, value: String },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_spellings() {
        let env = MapEnvironment::from([("A", "Yes"), ("B", "off"), ("C", "maybe")]);

        assert!(env.enabled("A", false).unwrap());
        assert!(!env.enabled("B", true).unwrap());
        assert!(env.enabled("MISSING", true).unwrap());
        assert!(matches!(
            env.enabled("C", false),
            Err(EnvError::InvalidBoolean { .. })
        ));
    }

    #[test]
    fn numbers() {
        let env = MapEnvironment::from([("DEPTH", " 12 "), ("BAD", "-3")]);

        assert_eq!(env.get_u64("DEPTH").unwrap(), Some(12));
        assert_eq!(env.get_u64("MISSING").unwrap(), None);
        assert!(matches!(
            env.get_u64("BAD"),
            Err(EnvError::InvalidNumber { .. })
        ));
    }
}
