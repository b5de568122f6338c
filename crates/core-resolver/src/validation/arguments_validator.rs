// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{Pos, Positioned, types::Field};
use async_graphql_value::{ConstValue, Name, Value as GraphQLValue, indexmap::IndexMap};
use serde_json::{Map, Value};

use fieldwise_model::{ArgumentDefinition, FieldType, Schema};

use crate::validation::validation_error::ValidationError;

pub struct ArgumentValidator<'a, C, P> {
    schema: &'a Schema<C, P>,
    field: &'a Positioned<Field>,
}

impl<'a, C, P> ArgumentValidator<'a, C, P> {
    #[must_use]
    pub fn new(schema: &'a Schema<C, P>, field: &'a Positioned<Field>) -> Self {
        Self { schema, field }
    }

    /// Validations performed:
    /// - Ensure that all required arguments are provided
    /// - Ensure that there are no stray arguments (arguments that are not defined in the field)
    /// - Ensure that each argument value is accepted by its scalar type
    ///
    /// # Returns
    ///   The coerced arguments in declaration order, with defaults applied
    pub(super) fn validate(
        &self,
        argument_definitions: &[ArgumentDefinition],
    ) -> Result<Map<String, Value>, ValidationError> {
        let field_name = self.field.node.name.node.as_str();

        // Stray arguments tracking: 1. Maintain a map of all the arguments supplied in the query
        let mut field_arguments: IndexMap<&Name, &Positioned<GraphQLValue>> = self
            .field
            .node
            .arguments
            .iter()
            .map(|(name, value)| (&name.node, value))
            .collect();

        let mut validated_arguments = Map::new();

        for argument_definition in argument_definitions {
            // Stray arguments tracking: 2. Remove the argument being processed
            let argument_value = field_arguments.shift_remove(&Name::new(&argument_definition.name));

            if let Some(value) = self.validate_argument(argument_definition, argument_value)? {
                validated_arguments.insert(argument_definition.name.clone(), value);
            }
        }

        // Stray arguments tracking: 3. If any arguments are left, they are not defined in the field
        if !field_arguments.is_empty() {
            let stray_arguments = field_arguments
                .keys()
                .map(|name| name.to_string())
                .collect::<Vec<_>>();

            Err(ValidationError::StrayArguments(
                stray_arguments,
                field_name.to_string(),
                self.field.pos,
            ))
        } else {
            Ok(validated_arguments)
        }
    }

    /// Validate a single argument. `None` means the argument is omitted (and has no default).
    fn validate_argument(
        &self,
        argument_definition: &ArgumentDefinition,
        argument_value: Option<&Positioned<GraphQLValue>>,
    ) -> Result<Option<Value>, ValidationError> {
        match argument_value {
            Some(value) => {
                let const_value = value
                    .node
                    .clone()
                    .into_const()
                    .ok_or(ValidationError::VariablesNotSupported(value.pos))?;
                let json_value = self.to_json(argument_definition, const_value, value.pos)?;

                self.coerce(argument_definition, &argument_definition.ty, json_value, value.pos)
                    .map(Some)
            }
            None => match &argument_definition.default_value {
                Some(default_value) => self
                    .coerce(
                        argument_definition,
                        &argument_definition.ty,
                        default_value.clone(),
                        self.field.pos,
                    )
                    .map(Some),
                None if argument_definition.ty.is_nullable() => Ok(None),
                None => Err(ValidationError::RequiredArgumentNotFound(
                    argument_definition.name.clone(),
                    self.field.pos,
                )),
            },
        }
    }

    /// Input coercion against the declared type:
    /// - A null value is accepted only for a nullable type
    /// - A single value is accepted where a list is expected (and becomes a one-element list)
    /// - Scalars are checked (and normalized) by the scalar's `parse` function
    fn coerce(
        &self,
        argument_definition: &ArgumentDefinition,
        ty: &FieldType,
        value: Value,
        pos: Pos,
    ) -> Result<Value, ValidationError> {
        match ty {
            FieldType::NonNull(inner) => {
                if value.is_null() {
                    Err(ValidationError::InvalidArgumentValue {
                        argument_name: argument_definition.name.clone(),
                        message: format!("Expected a non-null value of type '{ty}'"),
                        pos,
                    })
                } else {
                    self.coerce(argument_definition, inner, value, pos)
                }
            }
            _ if value.is_null() => Ok(Value::Null),
            FieldType::List(inner) => match value {
                Value::Array(elems) => elems
                    .into_iter()
                    .map(|elem| self.coerce(argument_definition, inner, elem, pos))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                single => Ok(Value::Array(vec![self.coerce(
                    argument_definition,
                    inner,
                    single,
                    pos,
                )?])),
            },
            FieldType::Named(name) => {
                let scalar = self.schema.scalar_type(name).ok_or_else(|| {
                    ValidationError::InvalidArgumentType {
                        argument_name: argument_definition.name.clone(),
                        expected_type: name.clone(),
                        actual_type: json_type_name(&value).to_string(),
                        pos,
                    }
                })?;

                scalar
                    .parse(&value)
                    .map_err(|message| ValidationError::InvalidArgumentValue {
                        argument_name: argument_definition.name.clone(),
                        message,
                        pos,
                    })
            }
        }
    }

    fn to_json(
        &self,
        argument_definition: &ArgumentDefinition,
        value: ConstValue,
        pos: Pos,
    ) -> Result<Value, ValidationError> {
        let invalid = |actual_type: &str| ValidationError::InvalidArgumentType {
            argument_name: argument_definition.name.clone(),
            expected_type: argument_definition.ty.to_string(),
            actual_type: actual_type.to_string(),
            pos,
        };

        Ok(match value {
            ConstValue::Null => Value::Null,
            ConstValue::Number(number) => Value::Number(number),
            ConstValue::String(string) => Value::String(string),
            ConstValue::Boolean(boolean) => Value::Bool(boolean),
            ConstValue::List(elems) => Value::Array(
                elems
                    .into_iter()
                    .map(|elem| self.to_json(argument_definition, elem, pos))
                    .collect::<Result<_, _>>()?,
            ),
            ConstValue::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(name, elem)| {
                        self.to_json(argument_definition, elem, pos)
                            .map(|elem| (name.to_string(), elem))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            ConstValue::Enum(_) => return Err(invalid("Enum")),
            ConstValue::Binary(_) => return Err(invalid("Binary")),
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "List",
        Value::Object(_) => "Object",
    }
}
