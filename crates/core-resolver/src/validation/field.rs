// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Debug, Formatter};

use async_graphql_parser::Pos;
use async_graphql_value::Name;
use serde_json::{Map, Value};

use fieldwise_model::FieldDefinition;

pub const TYPENAME_FIELD: &str = "__typename";

/// What a selected field is bound to in the schema.
pub enum FieldBinding<'a, C, P> {
    /// The `__typename` meta field, available on every object type.
    Typename,
    Defined(&'a FieldDefinition<C, P>),
}

impl<C, P> Clone for FieldBinding<'_, C, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, P> Copy for FieldBinding<'_, C, P> {}

impl<C, P> Debug for FieldBinding<'_, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldBinding::Typename => f.write_str(TYPENAME_FIELD),
            FieldBinding::Defined(definition) => write!(f, "{}: {}", definition.name, definition.ty),
        }
    }
}

pub struct ValidatedField<'a, C, P> {
    pub alias: Option<Name>,
    /// The name of the field.
    pub name: Name,
    /// Coerced arguments, with defaults filled in. Omitted optional arguments are absent.
    pub arguments: Map<String, Value>,
    pub binding: FieldBinding<'a, C, P>,
    /// The subfields being selected in this field, if it is an object. Empty if no fields are
    /// being selected.
    pub subfields: Vec<ValidatedField<'a, C, P>>,
    pub pos: Pos,
}

impl<C, P> ValidatedField<'_, C, P> {
    pub fn output_name(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name).as_str()
    }
}

impl<C, P> Debug for ValidatedField<'_, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedField")
            .field("alias", &self.alias)
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("binding", &self.binding)
            .field("subfields", &self.subfields)
            .finish()
    }
}
