// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use fieldwise_env::{EnvError, Environment};

pub const FIELDWISE_LOG: &str = "FIELDWISE_LOG";

pub const FIELDWISE_MAX_SELECTION_DEPTH: &str = "FIELDWISE_MAX_SELECTION_DEPTH";
pub const FIELDWISE_SERIAL_FIELD_EXECUTION: &str = "FIELDWISE_SERIAL_FIELD_EXECUTION";
pub const FIELDWISE_EXECUTION_TIMEOUT_MS: &str = "FIELDWISE_EXECUTION_TIMEOUT_MS";

pub const DEFAULT_MAX_SELECTION_DEPTH: usize = 64;

pub fn get_max_selection_depth(env: &dyn Environment) -> Result<usize, EnvError> {
    match env.get_u64(FIELDWISE_MAX_SELECTION_DEPTH)? {
        Some(depth) => usize::try_from(depth).map_err(|_| EnvError::InvalidNumber {
            key: FIELDWISE_MAX_SELECTION_DEPTH.to_string(),
            value: depth.to_string(),
        }),
        None => Ok(DEFAULT_MAX_SELECTION_DEPTH),
    }
}

pub fn is_serial_field_execution(env: &dyn Environment) -> Result<bool, EnvError> {
    env.enabled(FIELDWISE_SERIAL_FIELD_EXECUTION, false)
}

/// Upper bound for a whole operation. Unset or zero means no timeout.
pub fn get_execution_timeout(env: &dyn Environment) -> Result<Option<Duration>, EnvError> {
    Ok(env
        .get_u64(FIELDWISE_EXECUTION_TIMEOUT_MS)?
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwise_env::MapEnvironment;

    #[test]
    fn defaults() {
        let env = MapEnvironment::new();

        assert_eq!(
            get_max_selection_depth(&env).unwrap(),
            DEFAULT_MAX_SELECTION_DEPTH
        );
        assert!(!is_serial_field_execution(&env).unwrap());
        assert_eq!(get_execution_timeout(&env).unwrap(), None);
    }

    #[test]
    fn explicit_values() {
        let env = MapEnvironment::from([
            (FIELDWISE_MAX_SELECTION_DEPTH, "5"),
            (FIELDWISE_SERIAL_FIELD_EXECUTION, "true"),
            (FIELDWISE_EXECUTION_TIMEOUT_MS, "250"),
        ]);

        assert_eq!(get_max_selection_depth(&env).unwrap(), 5);
        assert!(is_serial_field_execution(&env).unwrap());
        assert_eq!(
            get_execution_timeout(&env).unwrap(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn invalid_depth() {
        let env = MapEnvironment::from([(FIELDWISE_MAX_SELECTION_DEPTH, "-1")]);
        assert!(matches!(
            get_max_selection_depth(&env),
            Err(EnvError::InvalidNumber { .. })
        ));

        let env = MapEnvironment::from([(FIELDWISE_MAX_SELECTION_DEPTH, "4294967295")]);
        assert_eq!(get_max_selection_depth(&env).unwrap(), u32::MAX as usize);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn depth_beyond_usize_is_rejected() {
        let env = MapEnvironment::from([(FIELDWISE_MAX_SELECTION_DEPTH, "4294967296")]);

        assert!(matches!(
            get_max_selection_depth(&env),
            Err(EnvError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn zero_timeout_disables() {
        let env = MapEnvironment::from([(FIELDWISE_EXECUTION_TIMEOUT_MS, "0")]);

        assert_eq!(get_execution_timeout(&env).unwrap(), None);
    }
}
