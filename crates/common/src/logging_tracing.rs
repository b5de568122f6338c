// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The executor is instrumented with Rust's `tracing` framework: validation and execution run
//! inside spans, resolver failures are reported as `debug` events and a null reaching the root of
//! an operation as a `warn` event.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `FIELDWISE_LOG` environment variable which follows the same conventions as `RUST_LOG`
//! (for example `FIELDWISE_LOG=fieldwise_resolver=debug`). Without it, only warnings are shown.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

use fieldwise_env::{Environment, SystemEnvironment};

use crate::env_const::FIELDWISE_LOG;

/// Initialize the tracing subscriber from the process environment.
pub fn init() -> Result<(), LoggingError> {
    init_with_env(&SystemEnvironment)
}

/// Initialize the tracing subscriber, reading the filter directives from `env`.
///
/// Creates a compact `tracing_subscriber::fmt` layer filtered by `FIELDWISE_LOG`.
pub fn init_with_env(env: &dyn Environment) -> Result<(), LoggingError> {
    let fmt_layer = tracing_subscriber::fmt::layer().compact();

    tracing_subscriber::registry()
        .with(env_filter(env))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

fn env_filter(env: &dyn Environment) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(env.get(FIELDWISE_LOG).unwrap_or_default())
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Tracing subscriber could not be installed: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwise_env::MapEnvironment;

    #[test]
    fn default_filter_is_warn() {
        let filter = env_filter(&MapEnvironment::new());

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn filter_from_environment() {
        let filter = env_filter(&MapEnvironment::from([(FIELDWISE_LOG, "debug")]));

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
