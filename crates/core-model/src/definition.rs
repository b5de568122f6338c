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
use serde_json::Value;

use crate::{resolver::Resolver, scalar::ScalarType, types::FieldType};

/// An argument accepted by a field, such as `id: ID!` or `first: Int = 10`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: FieldType,
    pub default_value: Option<Value>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
        }
    }

    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

pub struct FieldDefinition<C, P> {
    pub name: String,
    pub ty: FieldType,
    /// In declaration order.
    pub arguments: Vec<ArgumentDefinition>,
    pub description: Option<String>,
    resolver: Arc<dyn Resolver<C, P>>,
}

impl<C, P> FieldDefinition<C, P> {
    pub fn new(name: impl Into<String>, ty: FieldType, resolver: Arc<dyn Resolver<C, P>>) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: vec![],
            description: None,
            resolver,
        }
    }

    pub fn argument(mut self, argument: ArgumentDefinition) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn resolver(&self) -> &dyn Resolver<C, P> {
        self.resolver.as_ref()
    }

    pub fn argument_definition(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.arguments.iter().find(|argument| argument.name == name)
    }
}

impl<C, P> Debug for FieldDefinition<C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

pub struct ObjectType<C, P> {
    pub name: String,
    fields: IndexMap<String, FieldDefinition<C, P>>,
}

impl<C, P> ObjectType<C, P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition<C, P>> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition<C, P>> {
        self.fields.values()
    }

    /// Returns the field back if one with the same name already exists.
    pub(crate) fn add_field(
        &mut self,
        field: FieldDefinition<C, P>,
    ) -> Result<(), FieldDefinition<C, P>> {
        if self.fields.contains_key(&field.name) {
            Err(field)
        } else {
            self.fields.insert(field.name.clone(), field);
            Ok(())
        }
    }
}

impl<C, P> Debug for ObjectType<C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("fields", &self.fields.values().collect::<Vec<_>>())
            .finish()
    }
}

pub enum TypeDefinition<C, P> {
    Scalar(ScalarType),
    Object(ObjectType<C, P>),
}

impl<C, P> TypeDefinition<C, P> {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(scalar) => &scalar.name,
            TypeDefinition::Object(object) => &object.name,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType<C, P>> {
        match self {
            TypeDefinition::Object(object) => Some(object),
            TypeDefinition::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            TypeDefinition::Scalar(scalar) => Some(scalar),
            TypeDefinition::Object(_) => None,
        }
    }
}

impl<C, P> Debug for TypeDefinition<C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDefinition::Scalar(scalar) => scalar.fmt(f),
            TypeDefinition::Object(object) => object.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoExecutionParameters, resolver::property_resolver};

    #[test]
    fn field_debug_output() {
        let field: FieldDefinition<(), NoExecutionParameters> = FieldDefinition::new(
            "email",
            FieldType::named("String"),
            property_resolver("email"),
        )
        .description("Primary contact address");

        let debug = format!("{field:?}");

        assert!(debug.contains(r#"name: "email""#));
        assert!(debug.contains(r#"description: Some("Primary contact address")"#));
    }
}
