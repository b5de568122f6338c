// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Display, Formatter};

use async_graphql_parser::types::{BaseType, Type};
use serde::{Deserialize, Serialize};

/// The declared type of a field or argument.
///
/// Positions are nullable unless wrapped in [`FieldType::NonNull`]. The `Named` variant refers to a
/// scalar or object type registered in the schema by name; references are checked when the schema
/// is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Named(String),
    List(Box<FieldType>),
    NonNull(Box<FieldType>),
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        FieldType::Named(name.into())
    }

    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    /// Wrap in `NonNull` (idempotent).
    pub fn non_null(self) -> Self {
        match self {
            FieldType::NonNull(_) => self,
            other => FieldType::NonNull(Box::new(other)),
        }
    }

    /// Parse a type reference written in GraphQL notation, such as `[User!]!`.
    pub fn parse(ty: &str) -> Option<Self> {
        Type::new(ty).map(|ty| (&ty).into())
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, FieldType::NonNull(_))
    }

    /// Name of the scalar or object type at the bottom of any list/non-null wrapping.
    pub fn innermost_name(&self) -> &str {
        match self {
            FieldType::Named(name) => name,
            FieldType::List(inner) | FieldType::NonNull(inner) => inner.innermost_name(),
        }
    }
}

impl From<&Type> for FieldType {
    fn from(ty: &Type) -> Self {
        let base = match &ty.base {
            BaseType::Named(name) => FieldType::Named(name.to_string()),
            BaseType::List(inner) => FieldType::List(Box::new(inner.as_ref().into())),
        };

        if ty.nullable { base } else { base.non_null() }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Named(name) => f.write_str(name),
            FieldType::List(inner) => write!(f, "[{inner}]"),
            FieldType::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}
