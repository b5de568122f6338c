// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

static NULL: Value = Value::Null;

pub type ResolverResult = Result<RawValue, ResolverError>;

/// What a resolver hands back, before it is coerced to the field's declared type.
///
/// Most resolvers produce a plain JSON value. The `List` form is for resolvers that fetch a
/// collection item by item and want to report a failure for individual elements without failing
/// the whole list.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Value(Value),
    List(Vec<Result<RawValue, ResolverError>>),
}

impl RawValue {
    pub fn null() -> Self {
        RawValue::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Value(Value::Null))
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Value(value)
    }
}

impl FromIterator<Result<RawValue, ResolverError>> for RawValue {
    fn from_iter<I: IntoIterator<Item = Result<RawValue, ResolverError>>>(iter: I) -> Self {
        RawValue::List(iter.into_iter().collect())
    }
}

/// A failure reported by a resolver. Recorded against the field's path in the response.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ResolverError {
    message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ResolverError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ResolverError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for ResolverError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

impl From<anyhow::Error> for ResolverError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(format!("{error:#}"))
    }
}

/// Everything a resolver gets to see for one field.
///
/// `context` and `parameters` are the same for every field of an execution; `parent` is the value
/// produced for the enclosing object (`null` for root fields) and `arguments` are the field's
/// validated arguments, defaults included.
pub struct Invocation<'a, C, P> {
    pub context: &'a C,
    pub parameters: &'a P,
    pub parent: &'a Value,
    pub arguments: &'a Map<String, Value>,
    pub field_name: &'a str,
}

impl<C, P> Clone for Invocation<'_, C, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, P> Copy for Invocation<'_, C, P> {}

impl<'a, C, P> Invocation<'a, C, P> {
    /// Deserialize an argument. An omitted argument deserializes from `null`, so optional
    /// arguments are best read as `Option<T>`.
    pub fn argument<T: DeserializeOwned>(&self, name: &str) -> Result<T, ResolverError> {
        let value = self.arguments.get(name).cloned().unwrap_or(Value::Null);

        serde_json::from_value(value)
            .map_err(|e| ResolverError::new(format!("Invalid argument '{name}': {e}")))
    }

    /// A property of the parent value, `null` if the parent has no such property.
    pub fn parent_property(&self, key: &str) -> &'a Value {
        self.parent.get(key).unwrap_or(&NULL)
    }
}

/// Produces the raw value of a field.
///
/// A resolver is bound to a field for the lifetime of the schema and must not keep per-request
/// state; anything request specific comes in through the [`Invocation`].
#[async_trait]
pub trait Resolver<C, P>: Send + Sync {
    async fn resolve<'a>(&'a self, invocation: Invocation<'a, C, P>) -> ResolverResult;
}

struct FnResolver<F>(F);

#[async_trait]
impl<C, P, F> Resolver<C, P> for FnResolver<F>
where
    C: Send + Sync,
    P: Send + Sync,
    F: for<'a> Fn(Invocation<'a, C, P>) -> BoxFuture<'a, ResolverResult> + Send + Sync,
{
    async fn resolve<'a>(&'a self, invocation: Invocation<'a, C, P>) -> ResolverResult {
        (self.0)(invocation).await
    }
}

struct SyncResolver<F>(F);

#[async_trait]
impl<C, P, F> Resolver<C, P> for SyncResolver<F>
where
    C: Send + Sync,
    P: Send + Sync,
    F: Fn(Invocation<'_, C, P>) -> ResolverResult + Send + Sync,
{
    async fn resolve<'a>(&'a self, invocation: Invocation<'a, C, P>) -> ResolverResult {
        (self.0)(invocation)
    }
}

/// A resolver that may suspend, written as a closure returning a boxed future:
///
/// ```ignore
/// resolver_fn(|invocation: Invocation<'_, Db, NoExecutionParameters>| {
///     async move { invocation.context.load_user().await }.boxed()
/// })
/// ```
pub fn resolver_fn<C, P, F>(f: F) -> Arc<dyn Resolver<C, P>>
where
    C: Send + Sync + 'static,
    P: Send + Sync + 'static,
    F: for<'a> Fn(Invocation<'a, C, P>) -> BoxFuture<'a, ResolverResult> + Send + Sync + 'static,
{
    Arc::new(FnResolver(f))
}

/// A resolver that completes immediately.
pub fn sync_resolver<C, P, F>(f: F) -> Arc<dyn Resolver<C, P>>
where
    C: Send + Sync + 'static,
    P: Send + Sync + 'static,
    F: Fn(Invocation<'_, C, P>) -> ResolverResult + Send + Sync + 'static,
{
    Arc::new(SyncResolver(f))
}

/// Reads `key` from the parent value (`null` when absent).
pub fn property_resolver<C, P>(key: impl Into<String>) -> Arc<dyn Resolver<C, P>>
where
    C: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    let key = key.into();
    sync_resolver(move |invocation: Invocation<'_, C, P>| {
        Ok(invocation.parent_property(&key).clone().into())
    })
}
