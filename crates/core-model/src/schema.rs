// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    context::NoExecutionParameters,
    definition::{FieldDefinition, ObjectType, TypeDefinition},
    scalar::ScalarType,
    types::FieldType,
};

pub const QUERY_ROOT_TYPENAME: &str = "Query";
pub const MUTATION_ROOT_TYPENAME: &str = "Mutation";

pub type ContextCreator<C> = Arc<dyn Fn() -> C + Send + Sync>;

/// Registry of the types and resolvers an executor works against.
///
/// The schema is mutable only until [`Schema::complete`] succeeds. Completion checks that every
/// type referenced by a field or argument is registered; afterwards the schema is read-only and
/// may be shared (typically behind an `Arc`) by any number of concurrent executions.
pub struct Schema<C, P = NoExecutionParameters> {
    types: IndexMap<String, TypeDefinition<C, P>>,
    context_creator: Option<ContextCreator<C>>,
    completed: bool,
}

impl<C, P> Default for Schema<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, P> Schema<C, P> {
    /// An empty schema with the built-in scalars (`Int`, `Float`, `String`, `Boolean`, `ID`).
    pub fn new() -> Self {
        let types = ScalarType::builtins()
            .into_iter()
            .map(|scalar| (scalar.name.clone(), TypeDefinition::Scalar(scalar)))
            .collect();

        Self {
            types,
            context_creator: None,
            completed: false,
        }
    }

    /// Lets executions run without a caller supplied context; one is created per execution.
    pub fn with_context_creator(mut self, creator: impl Fn() -> C + Send + Sync + 'static) -> Self {
        self.context_creator = Some(Arc::new(creator));
        self
    }

    pub fn register_type(&mut self, definition: TypeDefinition<C, P>) -> Result<(), SchemaError> {
        self.ensure_mutable()?;

        let name = definition.name().to_string();
        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateType(name));
        }
        self.types.insert(name, definition);
        Ok(())
    }

    pub fn register_object(&mut self, name: &str) -> Result<(), SchemaError> {
        self.register_type(TypeDefinition::Object(ObjectType::new(name)))
    }

    pub fn register_scalar(&mut self, scalar: ScalarType) -> Result<(), SchemaError> {
        self.register_type(TypeDefinition::Scalar(scalar))
    }

    /// Add a field to an already registered object type. The field's own type may refer to types
    /// that are registered later.
    pub fn register_field(
        &mut self,
        type_name: &str,
        field: FieldDefinition<C, P>,
    ) -> Result<(), SchemaError> {
        self.ensure_mutable()?;

        match self.types.get_mut(type_name) {
            Some(TypeDefinition::Object(object)) => object.add_field(field).map_err(|field| {
                SchemaError::DuplicateField {
                    type_name: type_name.to_string(),
                    field_name: field.name,
                }
            }),
            Some(TypeDefinition::Scalar(_)) => {
                Err(SchemaError::NotAnObjectType(type_name.to_string()))
            }
            None => Err(SchemaError::UnknownType(type_name.to_string())),
        }
    }

    /// Validate the type graph and seal the schema.
    ///
    /// Validations performed:
    /// - A `Query` object type exists
    /// - Every field type refers to a registered type
    /// - Every argument type refers to a registered scalar
    pub fn complete(&mut self) -> Result<(), SchemaError> {
        self.ensure_mutable()?;

        match self.types.get(QUERY_ROOT_TYPENAME) {
            Some(TypeDefinition::Object(_)) => {}
            _ => return Err(SchemaError::MissingQueryRoot),
        }
        if let Some(TypeDefinition::Scalar(_)) = self.types.get(MUTATION_ROOT_TYPENAME) {
            return Err(SchemaError::NotAnObjectType(
                MUTATION_ROOT_TYPENAME.to_string(),
            ));
        }

        for object in self.types.values().filter_map(TypeDefinition::as_object) {
            for field in object.fields() {
                let referenced_by = format!("{}.{}", object.name, field.name);

                if !self.types.contains_key(field.ty.innermost_name()) {
                    return Err(SchemaError::UnresolvedTypeReference {
                        type_name: field.ty.innermost_name().to_string(),
                        referenced_by,
                    });
                }

                for argument in &field.arguments {
                    match self.types.get(argument.ty.innermost_name()) {
                        Some(TypeDefinition::Scalar(_)) => {}
                        Some(TypeDefinition::Object(_)) => {
                            return Err(SchemaError::InvalidArgumentType {
                                argument_name: argument.name.clone(),
                                argument_type: argument.ty.clone(),
                                referenced_by,
                            });
                        }
                        None => {
                            return Err(SchemaError::UnresolvedTypeReference {
                                type_name: argument.ty.innermost_name().to_string(),
                                referenced_by: format!("{referenced_by}({})", argument.name),
                            });
                        }
                    }
                }
            }
        }

        self.completed = true;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition<C, P>> {
        self.types.get(name)
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType<C, P>> {
        self.get_type(name).and_then(TypeDefinition::as_object)
    }

    pub fn scalar_type(&self, name: &str) -> Option<&ScalarType> {
        self.get_type(name).and_then(TypeDefinition::as_scalar)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition<C, P>> {
        self.types.values()
    }

    pub fn query_type(&self) -> Option<&ObjectType<C, P>> {
        self.object_type(QUERY_ROOT_TYPENAME)
    }

    pub fn mutation_type(&self) -> Option<&ObjectType<C, P>> {
        self.object_type(MUTATION_ROOT_TYPENAME)
    }

    pub fn has_context_creator(&self) -> bool {
        self.context_creator.is_some()
    }

    /// A fresh context from the configured creator, if any.
    pub fn create_context(&self) -> Option<C> {
        self.context_creator.as_ref().map(|creator| creator())
    }

    /// Resolve a field type to the type definition at its core.
    pub fn underlying_type(&self, ty: &FieldType) -> Option<&TypeDefinition<C, P>> {
        self.get_type(ty.innermost_name())
    }

    fn ensure_mutable(&self) -> Result<(), SchemaError> {
        if self.completed {
            Err(SchemaError::AlreadyComplete)
        } else {
            Ok(())
        }
    }
}

impl<C, P> Debug for Schema<C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types.values().collect::<Vec<_>>())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Schema is already complete and can no longer be modified")]
    AlreadyComplete,

    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    #[error("Field '{field_name}' is already defined on type '{type_name}'")]
    DuplicateField {
        type_name: String,
        field_name: String,
    },

    #[error("Type '{0}' is not registered")]
    UnknownType(String),

    #[error("Type '{0}' is not an object type")]
    NotAnObjectType(String),

    #[error("Type '{type_name}' referenced by '{referenced_by}' is not registered")]
    UnresolvedTypeReference {
        type_name: String,
        referenced_by: String,
    },

    #[error("Schema must define a '{}' object type", QUERY_ROOT_TYPENAME)]
    MissingQueryRoot,

    #[error(
        "Argument '{argument_name}' of '{referenced_by}' has type '{argument_type}', which is not a scalar type"
    )]
    InvalidArgumentType {
        argument_name: String,
        argument_type: FieldType,
        referenced_by: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArgumentDefinition, NoExecutionParameters, property_resolver};

    type TestSchema = Schema<(), NoExecutionParameters>;

    fn field(name: &str, ty: &str) -> FieldDefinition<(), NoExecutionParameters> {
        FieldDefinition::new(name, FieldType::parse(ty).unwrap(), property_resolver(name))
    }

    #[test]
    fn complete_valid_schema() {
        let mut schema = TestSchema::new();
        schema.register_object("Query").unwrap();
        schema.register_field("Query", field("user", "User")).unwrap();
        // Forward reference: `User` is registered after the field referring to it
        schema.register_object("User").unwrap();
        schema.register_field("User", field("name", "String!")).unwrap();

        assert!(!schema.is_complete());
        schema.complete().unwrap();
        assert!(schema.is_complete());
    }

    #[test]
    fn unresolved_field_type() {
        let mut schema = TestSchema::new();
        schema.register_object("Query").unwrap();
        schema
            .register_field("Query", field("users", "[User]"))
            .unwrap();

        assert_eq!(
            schema.complete(),
            Err(SchemaError::UnresolvedTypeReference {
                type_name: "User".to_string(),
                referenced_by: "Query.users".to_string(),
            })
        );
        assert!(!schema.is_complete());
    }

    #[test]
    fn unresolved_argument_type() {
        let mut schema = TestSchema::new();
        schema.register_object("Query").unwrap();
        schema
            .register_field(
                "Query",
                field("user", "String")
                    .argument(ArgumentDefinition::new("id", FieldType::parse("Uuid!").unwrap())),
            )
            .unwrap();

        assert_eq!(
            schema.complete(),
            Err(SchemaError::UnresolvedTypeReference {
                type_name: "Uuid".to_string(),
                referenced_by: "Query.user(id)".to_string(),
            })
        );
    }

    #[test]
    fn object_argument_rejected() {
        let mut schema = TestSchema::new();
        schema.register_object("Query").unwrap();
        schema
            .register_field(
                "Query",
                field("echo", "String").argument(ArgumentDefinition::new(
                    "input",
                    FieldType::named("Query"),
                )),
            )
            .unwrap();

        assert!(matches!(
            schema.complete(),
            Err(SchemaError::InvalidArgumentType { .. })
        ));
    }

    #[test]
    fn query_root_required() {
        let mut schema = TestSchema::new();

        assert_eq!(schema.complete(), Err(SchemaError::MissingQueryRoot));
    }

    #[test]
    fn no_mutation_after_completion() {
        let mut schema = TestSchema::new();
        schema.register_object("Query").unwrap();
        schema.complete().unwrap();

        assert_eq!(
            schema.register_object("User"),
            Err(SchemaError::AlreadyComplete)
        );
        assert_eq!(
            schema.register_field("Query", field("hello", "String")),
            Err(SchemaError::AlreadyComplete)
        );
        assert_eq!(schema.complete(), Err(SchemaError::AlreadyComplete));
    }

    #[test]
    fn registration_errors() {
        let mut schema = TestSchema::new();
        schema.register_object("Query").unwrap();
        schema.register_field("Query", field("hello", "String")).unwrap();

        assert_eq!(
            schema.register_object("Query"),
            Err(SchemaError::DuplicateType("Query".to_string()))
        );
        assert_eq!(
            schema.register_field("Query", field("hello", "Int")),
            Err(SchemaError::DuplicateField {
                type_name: "Query".to_string(),
                field_name: "hello".to_string(),
            })
        );
        assert_eq!(
            schema.register_field("String", field("length", "Int")),
            Err(SchemaError::NotAnObjectType("String".to_string()))
        );
        assert_eq!(
            schema.register_field("User", field("name", "String")),
            Err(SchemaError::UnknownType("User".to_string()))
        );
    }

    #[test]
    fn builtin_scalars_registered() {
        let schema = TestSchema::new();

        for name in ["Int", "Float", "String", "Boolean", "ID"] {
            assert!(schema.scalar_type(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn context_creator() {
        let schema = Schema::<u32, NoExecutionParameters>::new().with_context_creator(|| 5);

        assert!(schema.has_context_creator());
        assert_eq!(schema.create_context(), Some(5));
        assert_eq!(TestSchema::new().create_context(), None);
    }
}
