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

use serde_json::{Number, Value};

/// Converts a value into the literal form for a scalar, or explains why it cannot.
pub type ScalarCoercion = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// A leaf type.
///
/// `serialize` is applied to whatever a resolver produced for a field of this type; `parse` is
/// applied to argument literals supplied in a query.
#[derive(Clone)]
pub struct ScalarType {
    pub name: String,
    serialize: ScalarCoercion,
    parse: ScalarCoercion,
}

impl ScalarType {
    pub fn new(
        name: impl Into<String>,
        serialize: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
        parse: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            serialize: Arc::new(serialize),
            parse: Arc::new(parse),
        }
    }

    pub fn serialize(&self, value: &Value) -> Result<Value, String> {
        (self.serialize)(value)
    }

    pub fn parse(&self, value: &Value) -> Result<Value, String> {
        (self.parse)(value)
    }

    pub fn int() -> Self {
        Self::new("Int", serialize_int, parse_int)
    }

    pub fn float() -> Self {
        Self::new("Float", coerce_float, coerce_float)
    }

    pub fn string() -> Self {
        Self::new("String", serialize_string, parse_string)
    }

    pub fn boolean() -> Self {
        Self::new("Boolean", coerce_boolean, coerce_boolean)
    }

    pub fn id() -> Self {
        Self::new("ID", coerce_id, coerce_id)
    }

    /// Scalars every schema starts with.
    pub fn builtins() -> Vec<Self> {
        vec![
            Self::int(),
            Self::float(),
            Self::string(),
            Self::boolean(),
            Self::id(),
        ]
    }
}

impl Debug for ScalarType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn int_from_number(number: &Number) -> Option<i64> {
    let int = match number.as_i64() {
        Some(int) => Some(int),
        None => number
            .as_f64()
            .filter(|float| float.fract() == 0.0)
            .map(|float| float as i64),
    };

    int.filter(|int| i32::try_from(*int).is_ok())
}

fn serialize_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(number) => int_from_number(number)
            .map(Value::from)
            .ok_or_else(|| format!("Int cannot represent value: {number}")),
        Value::Bool(boolean) => Ok(Value::from(*boolean as i64)),
        other => Err(format!("Int cannot represent non-integer value: {other}")),
    }
}

fn parse_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => int_from_number(number)
            .map(Value::from)
            .ok_or_else(|| format!("Int cannot represent value: {number}")),
        other => Err(format!("Int cannot represent non-integer value: {other}")),
    }
}

fn coerce_float(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("Float cannot represent value: {number}")),
        other => Err(format!("Float cannot represent non-numeric value: {other}")),
    }
}

fn serialize_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(number) => Ok(Value::String(number.to_string())),
        Value::Bool(boolean) => Ok(Value::String(boolean.to_string())),
        other => Err(format!("String cannot represent value: {other}")),
    }
}

fn parse_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        other => Err(format!("String cannot represent a non string value: {other}")),
    }
}

fn coerce_boolean(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        other => Err(format!("Boolean cannot represent a non boolean value: {other}")),
    }
}

fn coerce_id(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(number) if number.is_i64() || number.is_u64() => {
            Ok(Value::String(number.to_string()))
        }
        other => Err(format!("ID cannot represent value: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_output() {
        let int = ScalarType::int();

        assert_eq!(int.serialize(&json!(42)), Ok(json!(42)));
        assert_eq!(int.serialize(&json!(7.0)), Ok(json!(7)));
        assert_eq!(int.serialize(&json!(true)), Ok(json!(1)));
        assert!(int.serialize(&json!(1.5)).is_err());
        assert!(int.serialize(&json!(i64::MAX)).is_err());
        assert!(int.serialize(&json!("42")).is_err());
    }

    #[test]
    fn int_input_is_strict() {
        let int = ScalarType::int();

        assert_eq!(int.parse(&json!(3)), Ok(json!(3)));
        assert!(int.parse(&json!(3.0)).is_err());
        assert!(int.parse(&json!(true)).is_err());
    }

    #[test]
    fn float_accepts_integers() {
        let float = ScalarType::float();

        assert_eq!(float.serialize(&json!(2)), Ok(json!(2.0)));
        assert!(float.parse(&json!("2.0")).is_err());
    }

    #[test]
    fn string_output_stringifies_primitives() {
        let string = ScalarType::string();

        assert_eq!(string.serialize(&json!("world")), Ok(json!("world")));
        assert_eq!(string.serialize(&json!(12)), Ok(json!("12")));
        assert_eq!(string.serialize(&json!(false)), Ok(json!("false")));
        assert!(string.serialize(&json!({"a": 1})).is_err());
        assert!(string.parse(&json!(12)).is_err());
    }

    #[test]
    fn id_accepts_strings_and_integers() {
        let id = ScalarType::id();

        assert_eq!(id.serialize(&json!(7)), Ok(json!("7")));
        assert_eq!(id.parse(&json!("abc")), Ok(json!("abc")));
        assert!(id.parse(&json!(1.5)).is_err());
    }

    #[test]
    fn custom_scalar() {
        let upper = ScalarType::new(
            "Upper",
            |value| {
                value
                    .as_str()
                    .map(|s| Value::String(s.to_uppercase()))
                    .ok_or_else(|| "expected a string".to_string())
            },
            |value| Ok(value.clone()),
        );

        assert_eq!(upper.serialize(&json!("abc")), Ok(json!("ABC")));
        assert_eq!(
            upper.serialize(&json!(1)),
            Err("expected a string".to_string())
        );
    }
}
