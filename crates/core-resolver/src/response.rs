// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use fieldwise_model::ResolverError;

/// One step from the response root: a response key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a value in the response, such as `["users", 2, "name"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResponsePath(Vec<PathSegment>);

impl ResponsePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, response_key: &str) -> Self {
        self.with(PathSegment::Field(response_key.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with(PathSegment::Index(index))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Self(segments)
    }
}

impl Display for ResponsePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Field(name) => f.write_str(name)?,
                PathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldErrorKind {
    /// The field's resolver reported a failure.
    Resolver,
    /// A scalar's output coercion rejected the resolved value.
    ScalarCoercion,
    /// A non-null position resolved to null.
    NonNullViolation,
    /// A list type resolved to something that is not a list.
    ListExpected,
    /// An object type resolved to a list.
    ObjectExpected,
}

/// A failure local to one field. The field (or the nearest nullable position above it) is null in
/// the response.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message} (at {path})")]
pub struct FieldError {
    pub message: String,
    pub path: ResponsePath,
    #[serde(skip)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(message: impl Into<String>, path: ResponsePath, kind: FieldErrorKind) -> Self {
        Self {
            message: message.into(),
            path,
            kind,
        }
    }

    pub(crate) fn resolver(error: ResolverError, path: ResponsePath) -> Self {
        Self::new(error.message(), path, FieldErrorKind::Resolver)
    }
}

/// Outcome of a successful execution: the data in selection order plus any field errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResponse {
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl QueryResponse {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The conventional `{"data": ..., "errors": [...]}` form.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_display_and_serialization() {
        let path = ResponsePath::root().field("users").index(2).field("name");

        assert_eq!(path.to_string(), "users.2.name");
        assert_eq!(serde_json::to_value(&path).unwrap(), json!(["users", 2, "name"]));
    }

    #[test]
    fn response_json() {
        let mut data = Map::new();
        data.insert("hello".to_string(), json!("world"));
        data.insert("failing".to_string(), Value::Null);

        let response = QueryResponse {
            data,
            errors: vec![FieldError::new(
                "database unavailable",
                ResponsePath::root().field("failing"),
                FieldErrorKind::Resolver,
            )],
        };

        assert_eq!(
            response.to_json().unwrap(),
            json!({
                "data": {"hello": "world", "failing": null},
                "errors": [{"message": "database unavailable", "path": ["failing"]}]
            })
        );
    }

    #[test]
    fn errors_omitted_when_empty() {
        let response = QueryResponse::default();

        assert!(response.is_ok());
        assert_eq!(response.to_json().unwrap(), json!({"data": {}}));
    }
}
