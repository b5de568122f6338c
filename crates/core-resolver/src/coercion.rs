// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Completion of raw resolver output against a field's declared type.

use async_recursion::async_recursion;
use serde_json::Value;

use fieldwise_model::{FieldType, RawValue, ResolverError, TypeDefinition};

use crate::{
    field_executor::{Completion, FieldExecutor, NullBubble},
    response::{FieldError, FieldErrorKind, ResponsePath},
    validation::field::ValidatedField,
};

type RawItem = Result<RawValue, ResolverError>;

impl<'a, C, P> FieldExecutor<'a, C, P>
where
    C: Send + Sync,
    P: Send + Sync,
{
    /// Complete `raw` against `ty`.
    ///
    /// A null in a non-null position records a [`FieldErrorKind::NonNullViolation`] and bubbles. A
    /// bubble coming out of a nullable position stops there and leaves `null` in its place.
    #[async_recursion]
    pub(crate) async fn complete_value(
        &self,
        ty: &FieldType,
        field: &ValidatedField<'a, C, P>,
        raw: RawValue,
        path: &ResponsePath,
        errors: &mut Vec<FieldError>,
    ) -> Completion {
        match ty {
            FieldType::NonNull(inner) => {
                if raw.is_null() {
                    errors.push(FieldError::new(
                        format!(
                            "Cannot return null for non-nullable field '{}' of type '{ty}'",
                            field.name
                        ),
                        path.clone(),
                        FieldErrorKind::NonNullViolation,
                    ));
                    Err(NullBubble)
                } else {
                    self.complete_inner(inner, field, raw, path, errors).await
                }
            }
            _ if raw.is_null() => Ok(Value::Null),
            _ => Ok(self
                .complete_inner(ty, field, raw, path, errors)
                .await
                .unwrap_or(Value::Null)),
        }
    }

    /// Complete a non-null `raw` against the type inside any non-null wrapper.
    async fn complete_inner(
        &self,
        ty: &FieldType,
        field: &ValidatedField<'a, C, P>,
        raw: RawValue,
        path: &ResponsePath,
        errors: &mut Vec<FieldError>,
    ) -> Completion {
        match ty {
            FieldType::NonNull(_) => self.complete_value(ty, field, raw, path, errors).await,
            FieldType::List(item_type) => match into_items(raw) {
                Ok(items) => {
                    self.complete_list(item_type, field, items, path, errors)
                        .await
                }
                Err(raw) => {
                    errors.push(FieldError::new(
                        format!(
                            "Expected a list for field '{}', got {}",
                            field.name,
                            describe(&raw)
                        ),
                        path.clone(),
                        FieldErrorKind::ListExpected,
                    ));
                    Err(NullBubble)
                }
            },
            FieldType::Named(type_name) => match self.schema.get_type(type_name) {
                Some(TypeDefinition::Scalar(scalar)) => {
                    let coerced = match &raw {
                        RawValue::Value(value) => scalar.serialize(value),
                        RawValue::List(_) => Err(format!("{} cannot represent a list", scalar.name)),
                    };

                    coerced.map_err(|message| {
                        errors.push(FieldError::new(
                            message,
                            path.clone(),
                            FieldErrorKind::ScalarCoercion,
                        ));
                        NullBubble
                    })
                }
                Some(TypeDefinition::Object(object_type)) => match raw {
                    RawValue::Value(parent) if !parent.is_array() => self
                        .execute_selection_set(
                            object_type,
                            &field.subfields,
                            &parent,
                            path,
                            self.field_execution(),
                            errors,
                        )
                        .await
                        .map(Value::Object),
                    other => {
                        errors.push(FieldError::new(
                            format!(
                                "Expected an object of type '{}' for field '{}', got {}",
                                object_type.name,
                                field.name,
                                describe(&other)
                            ),
                            path.clone(),
                            FieldErrorKind::ObjectExpected,
                        ));
                        Err(NullBubble)
                    }
                },
                // Not reachable for a completed schema
                None => {
                    errors.push(FieldError::new(
                        format!("Type '{type_name}' is not registered"),
                        path.clone(),
                        FieldErrorKind::ScalarCoercion,
                    ));
                    Err(NullBubble)
                }
            },
        }
    }

    /// Complete each element independently. A failed element is null if the item type allows it;
    /// otherwise the whole list is replaced by a bubble.
    async fn complete_list(
        &self,
        item_type: &FieldType,
        field: &ValidatedField<'a, C, P>,
        items: Vec<RawItem>,
        path: &ResponsePath,
        errors: &mut Vec<FieldError>,
    ) -> Completion {
        let item_count = items.len();

        let completed = self
            .join(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| async move {
                        let path = path.index(index);
                        let mut item_errors = vec![];

                        let value = match item {
                            Ok(raw) => {
                                self.complete_value(item_type, field, raw, &path, &mut item_errors)
                                    .await
                            }
                            Err(error) => {
                                item_errors.push(FieldError::resolver(error, path));
                                if item_type.is_nullable() {
                                    Ok(Value::Null)
                                } else {
                                    Err(NullBubble)
                                }
                            }
                        };

                        (value, item_errors)
                    })
                    .collect(),
                self.field_execution(),
            )
            .await;

        let mut values = Vec::with_capacity(item_count);
        let mut bubbled = false;

        for (value, item_errors) in completed {
            errors.extend(item_errors);
            match value {
                Ok(value) => values.push(value),
                Err(NullBubble) => bubbled = true,
            }
        }

        if bubbled {
            Err(NullBubble)
        } else {
            Ok(Value::Array(values))
        }
    }
}

/// List elements of `raw`, or `raw` itself back if it is not a list.
fn into_items(raw: RawValue) -> Result<Vec<RawItem>, RawValue> {
    match raw {
        RawValue::List(items) => Ok(items),
        RawValue::Value(Value::Array(values)) => {
            Ok(values.into_iter().map(|value| Ok(value.into())).collect())
        }
        other => Err(other),
    }
}

fn describe(raw: &RawValue) -> String {
    match raw {
        RawValue::List(_) => "a list".to_string(),
        RawValue::Value(Value::Array(_)) => "a list".to_string(),
        RawValue::Value(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fieldwise_model::{
        Invocation, NoExecutionParameters, RawValue, ResolverError, Schema, property_resolver,
        sync_resolver,
    };
    use serde_json::{Value, json};
    use test_log::test;

    use crate::{
        executor::Executor,
        response::{FieldErrorKind, ResponsePath},
        test_support::field,
    };

    type Inv<'a> = Invocation<'a, (), NoExecutionParameters>;

    fn returning(
        name: &str,
        field_type: &str,
        value: impl Fn() -> RawValue + Send + Sync + 'static,
    ) -> fieldwise_model::FieldDefinition<(), NoExecutionParameters> {
        field(
            name,
            field_type,
            sync_resolver(move |_: Inv<'_>| Ok(value())),
        )
    }

    /// A schema whose root fields return deliberately awkward values.
    fn executor() -> Executor<()> {
        let mut schema: Schema<()> = Schema::new().with_context_creator(|| ());
        schema.register_object("Query").unwrap();
        schema.register_object("Point").unwrap();

        let fields = [
            returning("wholeFloat", "Int", || json!(7.0).into()),
            returning("notAnInt", "Int", || json!("seven").into()),
            returning("notAList", "[Int]", || json!(3).into()),
            returning("listForObject", "Point", || {
                RawValue::List(vec![Ok(json!({"x": 1}).into())])
            }),
            returning("arrayForObject", "Point", || json!([{"x": 1}]).into()),
            returning("matrix", "[[Int!]]", || json!([[1, 2], [3, "x"], [], null]).into()),
            returning("points", "[Point!]!", || {
                [
                    Ok(json!({"x": 1, "y": 2}).into()),
                    Err(ResolverError::new("point 2 unavailable")),
                ]
                .into_iter()
                .collect()
            }),
            returning("point", "Point", || json!({"x": 1.0, "y": "2"}).into()),
        ];
        for field in fields {
            schema.register_field("Query", field).unwrap();
        }

        schema
            .register_field("Point", field("x", "Int!", property_resolver("x")))
            .unwrap();
        schema
            .register_field("Point", field("y", "Int", property_resolver("y")))
            .unwrap();

        schema.complete().unwrap();
        Executor::new(Arc::new(schema))
    }

    #[test(tokio::test)]
    async fn integral_floats_serialize_as_int() {
        let response = executor().run("{ wholeFloat }").await.unwrap();

        assert_eq!(response.data["wholeFloat"], json!(7));
        assert!(response.errors.is_empty());
    }

    #[test(tokio::test)]
    async fn scalar_coercion_failure() {
        let response = executor().run("{ notAnInt wholeFloat }").await.unwrap();

        assert_eq!(response.data["notAnInt"], Value::Null);
        assert_eq!(response.data["wholeFloat"], json!(7));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].kind, FieldErrorKind::ScalarCoercion);
        assert_eq!(response.errors[0].path, ResponsePath::root().field("notAnInt"));
    }

    #[test(tokio::test)]
    async fn list_expected() {
        let response = executor().run("{ notAList }").await.unwrap();

        assert_eq!(response.data["notAList"], Value::Null);
        assert_eq!(response.errors[0].kind, FieldErrorKind::ListExpected);
        assert_eq!(
            response.errors[0].message,
            "Expected a list for field 'notAList', got 3"
        );
    }

    #[test(tokio::test)]
    async fn object_expected() {
        let response = executor()
            .run("{ listForObject { x } arrayForObject { x } }")
            .await
            .unwrap();

        assert_eq!(
            response.to_json().unwrap()["data"],
            json!({"listForObject": null, "arrayForObject": null})
        );
        assert_eq!(response.errors.len(), 2);
        assert!(
            response
                .errors
                .iter()
                .all(|error| error.kind == FieldErrorKind::ObjectExpected)
        );
    }

    #[test(tokio::test)]
    async fn nested_lists() {
        let response = executor().run("{ matrix }").await.unwrap();

        // The bad element nulls its inner (nullable) list only
        assert_eq!(
            response.data["matrix"],
            json!([[1, 2], null, [], null])
        );
        assert_eq!(response.errors.len(), 1);
        assert_eq!(
            response.errors[0].path,
            ResponsePath::root().field("matrix").index(1).index(1)
        );
    }

    #[test(tokio::test)]
    async fn failed_element_of_non_null_list_fails_the_operation() {
        let error = executor().run("{ points { x } }").await.unwrap_err();

        assert_eq!(error.field_errors().len(), 1);
        assert_eq!(error.field_errors()[0].message, "point 2 unavailable");
        assert_eq!(
            error.field_errors()[0].path,
            ResponsePath::root().field("points").index(1)
        );
    }

    #[test(tokio::test)]
    async fn object_fields_are_coerced() {
        let response = executor().run("{ point { x y } }").await.unwrap();

        assert_eq!(response.data["point"], json!({"x": 1, "y": null}));
        assert_eq!(
            response.errors[0].path,
            ResponsePath::root().field("point").field("y")
        );
    }
}
