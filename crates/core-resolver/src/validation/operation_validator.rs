// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use async_graphql_parser::{
    Positioned,
    types::{FragmentDefinition, OperationDefinition, OperationType},
};
use async_graphql_value::Name;

use fieldwise_model::{MUTATION_ROOT_TYPENAME, QUERY_ROOT_TYPENAME, Schema};

use crate::validation::validation_error::ValidationError;

use super::{
    operation::ValidatedOperation,
    selection_set_validator::{SelectionSetValidator, reject_directives},
};

/// Context for validating an operation.
pub struct OperationValidator<'a, C, P> {
    schema: &'a Schema<C, P>,
    operation_name: Option<String>,
    fragment_definitions: HashMap<Name, Positioned<FragmentDefinition>>,
    max_selection_depth: usize,
}

impl<'a, C, P> OperationValidator<'a, C, P> {
    #[must_use]
    pub fn new(
        schema: &'a Schema<C, P>,
        operation_name: Option<String>,
        fragment_definitions: HashMap<Name, Positioned<FragmentDefinition>>,
        max_selection_depth: usize,
    ) -> Self {
        Self {
            schema,
            operation_name,
            fragment_definitions,
            max_selection_depth,
        }
    }

    /// Validate operation. Operation defines a GraphQL top-level operation such
    /// as
    /// ```graphql
    ///    mutation {
    ///       createUser(name: "Ada") {
    ///          id
    ///       }
    ///    }
    /// ```
    ///
    /// Validations performed:
    /// - The operation is a query or a mutation and the schema has the matching root type
    /// - The operation declares no variables or directives
    /// - The selected fields are valid (see [SelectionSetValidator] for details)
    ///
    /// # Returns
    ///   A validated operation with all fragments inlined and fields normalized.
    pub(super) fn validate(
        self,
        operation: Positioned<OperationDefinition>,
    ) -> Result<ValidatedOperation<'a, C, P>, ValidationError> {
        let operation_type_name = match operation.node.ty {
            OperationType::Query => QUERY_ROOT_TYPENAME,
            OperationType::Mutation => MUTATION_ROOT_TYPENAME,
            OperationType::Subscription => {
                return Err(ValidationError::SubscriptionNotSupported(operation.pos));
            }
        };

        let root_type = self.schema.object_type(operation_type_name).ok_or_else(|| {
            ValidationError::OperationNotFound(operation_type_name.to_string(), operation.pos)
        })?;

        if let Some(variable_definition) = operation.node.variable_definitions.first() {
            return Err(ValidationError::VariablesNotSupported(
                variable_definition.pos,
            ));
        }
        reject_directives(&operation.node.directives)?;

        let selection_set_validator = SelectionSetValidator::new(
            self.schema,
            root_type,
            &self.fragment_definitions,
            self.max_selection_depth,
        );

        let fields =
            selection_set_validator.validate(&operation.node.selection_set, 1, &mut vec![])?;

        Ok(ValidatedOperation {
            name: self.operation_name,
            typ: operation.node.ty,
            root_type,
            fields,
        })
    }
}
