// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::types::{DocumentOperations, ExecutableDocument};
use tracing::instrument;

use fieldwise_model::Schema;

use crate::validation::validation_error::ValidationError;

use super::{operation::ValidatedOperation, operation_validator::OperationValidator};

/// Context for validating a document.
pub struct DocumentValidator<'a, C, P> {
    schema: &'a Schema<C, P>,
    max_selection_depth: usize,
}

impl<'a, C, P> DocumentValidator<'a, C, P> {
    pub fn new(schema: &'a Schema<C, P>, max_selection_depth: usize) -> Self {
        Self {
            schema,
            max_selection_depth,
        }
    }

    /// Validate the query document.
    ///
    /// Validations performed:
    /// - Validate that there is exactly one operation (selecting an operation by name is not
    ///   supported)
    /// - Other validations are delegated to the operation validator
    #[instrument(name = "DocumentValidator::validate", skip(self, document))]
    pub fn validate(
        self,
        document: ExecutableDocument,
    ) -> Result<ValidatedOperation<'a, C, P>, ValidationError> {
        let (operation_name, raw_operation) = match document.operations {
            DocumentOperations::Single(operation) => Ok((None, operation)),
            DocumentOperations::Multiple(operations) => {
                // async-graphql parses a named operation (`query Foo { ... }`) to
                // `DocumentOperations::Multiple` even if there is only one operation
                let mut operations = operations.into_iter();

                match (operations.next(), operations.next()) {
                    (None, _) => Err(ValidationError::NoOperationFound),
                    (Some((operation_name, operation)), None) => {
                        Ok((Some(operation_name.to_string()), operation))
                    }
                    (Some(_), Some(_)) => Err(ValidationError::MultipleOperations),
                }
            }
        }?;

        let operation_validator = OperationValidator::new(
            self.schema,
            operation_name,
            document.fragments,
            self.max_selection_depth,
        );

        operation_validator.validate(raw_operation)
    }
}
