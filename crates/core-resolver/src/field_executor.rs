// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::future::Future;

use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::debug;

use fieldwise_model::{Invocation, ObjectType, Schema};

use crate::{
    config::FieldExecution,
    response::{FieldError, ResponsePath},
    validation::field::{FieldBinding, ValidatedField},
};

/// A null that reached a non-null position and must replace the nearest nullable ancestor.
///
/// The error explaining it has already been recorded by the time this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NullBubble;

pub(crate) type Completion = Result<Value, NullBubble>;

/// Walks a validated selection tree, invoking resolvers and assembling their results.
///
/// Errors are accumulated per branch and appended to the caller's list at join points, in
/// selection order, so the error list does not depend on which branch finished first.
pub(crate) struct FieldExecutor<'a, C, P> {
    pub(crate) schema: &'a Schema<C, P>,
    context: &'a C,
    parameters: &'a P,
    field_execution: FieldExecution,
}

impl<'a, C, P> FieldExecutor<'a, C, P>
where
    C: Send + Sync,
    P: Send + Sync,
{
    pub(crate) fn new(
        schema: &'a Schema<C, P>,
        context: &'a C,
        parameters: &'a P,
        field_execution: FieldExecution,
    ) -> Self {
        Self {
            schema,
            context,
            parameters,
            field_execution,
        }
    }

    /// Resolve `fields` against `parent`, producing the object's entries in selection order.
    ///
    /// Fails with [`NullBubble`] if any non-null field resolved to null; every sibling is still
    /// resolved (and its errors recorded) in that case.
    pub(crate) async fn execute_selection_set(
        &self,
        object_type: &ObjectType<C, P>,
        fields: &[ValidatedField<'a, C, P>],
        parent: &Value,
        path: &ResponsePath,
        field_execution: FieldExecution,
        errors: &mut Vec<FieldError>,
    ) -> Result<Map<String, Value>, NullBubble> {
        let results = self
            .join(
                fields
                    .iter()
                    .map(|field| async move {
                        let mut field_errors = vec![];
                        let value = self
                            .resolve_field(object_type, field, parent, path, &mut field_errors)
                            .await;
                        (value, field_errors)
                    })
                    .collect(),
                field_execution,
            )
            .await;

        let mut data = Map::with_capacity(fields.len());
        let mut bubbled = false;

        for (field, (value, field_errors)) in fields.iter().zip(results) {
            errors.extend(field_errors);
            match value {
                Ok(value) => {
                    data.insert(field.output_name().to_string(), value);
                }
                Err(NullBubble) => bubbled = true,
            }
        }

        if bubbled { Err(NullBubble) } else { Ok(data) }
    }

    /// Resolve a single field: invoke its resolver with the parent value and complete the result
    /// against the field's declared type.
    async fn resolve_field(
        &self,
        object_type: &ObjectType<C, P>,
        field: &ValidatedField<'a, C, P>,
        parent: &Value,
        path: &ResponsePath,
        errors: &mut Vec<FieldError>,
    ) -> Completion {
        let path = path.field(field.output_name());

        let definition = match field.binding {
            FieldBinding::Typename => return Ok(Value::String(object_type.name.clone())),
            FieldBinding::Defined(definition) => definition,
        };

        let invocation = Invocation {
            context: self.context,
            parameters: self.parameters,
            parent,
            arguments: &field.arguments,
            field_name: &definition.name,
        };

        match definition.resolver().resolve(invocation).await {
            Ok(raw) => {
                self.complete_value(&definition.ty, field, raw, &path, errors)
                    .await
            }
            Err(error) => {
                debug!(%path, %error, "Resolver failed");
                errors.push(FieldError::resolver(error, path));

                // The failure itself is the error for this position; a non-null field passes the
                // null up without recording another one.
                if definition.ty.is_nullable() {
                    Ok(Value::Null)
                } else {
                    Err(NullBubble)
                }
            }
        }
    }

    /// Await `futures` concurrently, or one after the other for serial execution. Outputs are in
    /// input order either way.
    ///
    /// The futures must be collected up front; the completion future built around this has to
    /// stay `Send`.
    pub(crate) async fn join<F>(
        &self,
        futures: Vec<F>,
        field_execution: FieldExecution,
    ) -> Vec<F::Output>
    where
        F: Future,
    {
        match field_execution {
            FieldExecution::Concurrent => join_all(futures).await,
            FieldExecution::Serial => {
                let mut outputs = vec![];
                for future in futures {
                    outputs.push(future.await);
                }
                outputs
            }
        }
    }

    pub(crate) fn field_execution(&self) -> FieldExecution {
        self.field_execution
    }
}
