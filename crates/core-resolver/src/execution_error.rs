// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::{response::FieldError, validation::validation_error::ValidationError};

/// Failures that abort an execution as a whole. No partial data is produced for any of these.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Schema must be completed before executing a query")]
    SchemaIncomplete,

    #[error("No context supplied and the schema has no context creator")]
    MissingContext,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A null propagated from a non-null field all the way to the root.
    #[error("{}", root_null_message(.errors))]
    NullRoot { errors: Vec<FieldError> },

    #[error("Execution cancelled: {0}")]
    Cancelled(String),
}

impl ExecutionError {
    /// Field errors collected before the execution failed (only for [`ExecutionError::NullRoot`]).
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ExecutionError::NullRoot { errors } => errors,
            _ => &[],
        }
    }
}

fn root_null_message(errors: &[FieldError]) -> String {
    match errors.first() {
        Some(error) => format!("Non-null field resolved to null at the root: {error}"),
        None => "Non-null field resolved to null at the root".to_string(),
    }
}
