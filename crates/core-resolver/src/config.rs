// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use fieldwise_common::env_const::{
    DEFAULT_MAX_SELECTION_DEPTH, get_execution_timeout, get_max_selection_depth,
    is_serial_field_execution,
};
use fieldwise_env::{EnvError, Environment};

/// How sibling fields (and list elements) are scheduled.
///
/// Mutation root fields always run one after another, whatever the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldExecution {
    #[default]
    Concurrent,
    Serial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub max_selection_depth: usize,
    pub field_execution: FieldExecution,
    pub timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_selection_depth: DEFAULT_MAX_SELECTION_DEPTH,
            field_execution: FieldExecution::default(),
            timeout: None,
        }
    }
}

impl ExecutorConfig {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let field_execution = if is_serial_field_execution(env)? {
            FieldExecution::Serial
        } else {
            FieldExecution::Concurrent
        };

        Ok(Self {
            max_selection_depth: get_max_selection_depth(env)?,
            field_execution,
            timeout: get_execution_timeout(env)?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_field_execution(mut self, field_execution: FieldExecution) -> Self {
        self.field_execution = field_execution;
        self
    }

    pub fn with_max_selection_depth(mut self, max_selection_depth: usize) -> Self {
        self.max_selection_depth = max_selection_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwise_common::env_const::{
        FIELDWISE_EXECUTION_TIMEOUT_MS, FIELDWISE_MAX_SELECTION_DEPTH,
        FIELDWISE_SERIAL_FIELD_EXECUTION,
    };
    use fieldwise_env::MapEnvironment;

    #[test]
    fn from_empty_env() {
        let config = ExecutorConfig::from_env(&MapEnvironment::new()).unwrap();

        assert_eq!(config, ExecutorConfig::default());
    }

    #[test]
    fn from_env() {
        let env = MapEnvironment::from([
            (FIELDWISE_MAX_SELECTION_DEPTH, "8"),
            (FIELDWISE_SERIAL_FIELD_EXECUTION, "yes"),
            (FIELDWISE_EXECUTION_TIMEOUT_MS, "1500"),
        ]);

        assert_eq!(
            ExecutorConfig::from_env(&env).unwrap(),
            ExecutorConfig {
                max_selection_depth: 8,
                field_execution: FieldExecution::Serial,
                timeout: Some(Duration::from_millis(1500)),
            }
        );
    }

    #[test]
    fn invalid_env_value() {
        let env = MapEnvironment::from([(FIELDWISE_SERIAL_FIELD_EXECUTION, "sometimes")]);

        assert!(ExecutorConfig::from_env(&env).is_err());
    }
}
