// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![cfg(test)]

//! A small user directory schema shared by the validator and executor tests.
//!
//! ```graphql
//! type Query {
//!   hello: String
//!   greeting(name: String = "world"): String!
//!   user(id: ID!): User
//!   users: [User]
//!   usersById(ids: [ID!]!): [User]
//!   me: User!
//!   failing: String
//!   requiredFailing: String!
//!   delayed(millis: Int!): String
//!   slow: String
//! }
//!
//! type Mutation {
//!   append(entry: String!, delayMillis: Int = 0): [String!]!
//!   increment: Int!
//! }
//!
//! type User {
//!   id: ID!
//!   name: String!
//!   email: String
//!   manager: User
//!   friends: [User!]
//! }
//! ```
//!
//! User "3" has no name, so selecting `name` on it violates non-null.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, AtomicUsize, Ordering},
};
use std::time::Duration;

use futures::FutureExt;
use serde_json::{Value, json};

use fieldwise_model::{
    ArgumentDefinition, ExecutionContext, FieldDefinition, FieldType, Invocation,
    NoExecutionParameters, RawValue, Resolver, ResolverError, ResolverResult, Schema,
    property_resolver, resolver_fn, sync_resolver,
};

use crate::{config::ExecutorConfig, executor::Executor};

pub type TestSchema = Schema<TestContext>;
pub type TestInvocation<'a> = Invocation<'a, TestContext, NoExecutionParameters>;

/// Counters and an append-only log that outlive the contexts they are handed to.
#[derive(Clone, Default)]
pub struct Probe {
    releases: Arc<AtomicUsize>,
    resolver_calls: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    pub fn context(&self) -> TestContext {
        TestContext {
            users: users(),
            counter: AtomicI64::new(0),
            probe: self.clone(),
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn resolver_calls(&self) -> usize {
        self.resolver_calls.load(Ordering::SeqCst)
    }
}

pub struct TestContext {
    users: Vec<Value>,
    counter: AtomicI64,
    probe: Probe,
}

impl TestContext {
    fn user(&self, id: &str) -> Option<&Value> {
        self.users.iter().find(|user| user["id"] == id)
    }

    fn record_call(&self) {
        self.probe.resolver_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn append(&self, entry: String) -> Vec<String> {
        let mut log = self.probe.log.lock().unwrap();
        log.push(entry);
        log.clone()
    }
}

impl ExecutionContext for TestContext {
    fn release(&mut self) {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn users() -> Vec<Value> {
    vec![
        json!({"id": "1", "name": "Ada", "email": "ada@example.com", "managerId": null, "friendIds": ["2"]}),
        json!({"id": "2", "name": "Grace", "email": null, "managerId": "1", "friendIds": ["1", "99"]}),
        json!({"id": "3", "name": null, "email": "anon@example.com", "managerId": "1", "friendIds": []}),
    ]
}

pub fn ty(ty: &str) -> FieldType {
    FieldType::parse(ty).unwrap()
}

pub fn field<C, P>(
    name: &str,
    field_type: &str,
    resolver: Arc<dyn Resolver<C, P>>,
) -> FieldDefinition<C, P> {
    FieldDefinition::new(name, ty(field_type), resolver)
}

/// A resolver that counts its calls and then returns `value`.
fn constant(value: Value) -> Arc<dyn Resolver<TestContext, NoExecutionParameters>> {
    sync_resolver(move |invocation: TestInvocation<'_>| {
        invocation.context.record_call();
        Ok(value.clone().into())
    })
}

/// A resolver that counts its calls and then fails with `message`.
fn failure(message: &'static str) -> Arc<dyn Resolver<TestContext, NoExecutionParameters>> {
    sync_resolver(move |invocation: TestInvocation<'_>| {
        invocation.context.record_call();
        Err(ResolverError::new(message))
    })
}

async fn delayed(invocation: TestInvocation<'_>) -> ResolverResult {
    invocation.context.record_call();
    let millis: u64 = invocation.argument("millis")?;
    tokio::time::sleep(Duration::from_millis(millis)).await;
    invocation.context.append(format!("delayed {millis}"));

    Ok(json!(format!("waited {millis}ms")).into())
}

async fn slow(invocation: TestInvocation<'_>) -> ResolverResult {
    invocation.context.record_call();
    tokio::time::sleep(Duration::from_secs(60)).await;

    Ok(json!("finally").into())
}

async fn append(invocation: TestInvocation<'_>) -> ResolverResult {
    invocation.context.record_call();
    let entry: String = invocation.argument("entry")?;
    let delay_millis: u64 = invocation.argument("delayMillis")?;
    tokio::time::sleep(Duration::from_millis(delay_millis)).await;

    Ok(json!(invocation.context.append(entry)).into())
}

fn register_query(schema: &mut TestSchema) {
    schema.register_object("Query").unwrap();

    let fields = [
        field("hello", "String", constant(json!("world"))),
        field(
            "greeting",
            "String!",
            sync_resolver(|invocation: TestInvocation<'_>| {
                invocation.context.record_call();
                let name: String = invocation.argument("name")?;
                Ok(json!(format!("Hello, {name}!")).into())
            }),
        )
        .argument(ArgumentDefinition::new("name", ty("String")).with_default(json!("world"))),
        field(
            "user",
            "User",
            sync_resolver(|invocation: TestInvocation<'_>| {
                invocation.context.record_call();
                let id: String = invocation.argument("id")?;
                Ok(invocation
                    .context
                    .user(&id)
                    .cloned()
                    .unwrap_or(Value::Null)
                    .into())
            }),
        )
        .argument(ArgumentDefinition::new("id", ty("ID!"))),
        field(
            "users",
            "[User]",
            sync_resolver(|invocation: TestInvocation<'_>| {
                invocation.context.record_call();
                Ok(Value::Array(invocation.context.users.clone()).into())
            }),
        ),
        field(
            "usersById",
            "[User]",
            sync_resolver(|invocation: TestInvocation<'_>| {
                invocation.context.record_call();
                let ids: Vec<String> = invocation.argument("ids")?;
                Ok(ids
                    .iter()
                    .map(|id| {
                        invocation
                            .context
                            .user(id)
                            .cloned()
                            .map(RawValue::from)
                            .ok_or_else(|| ResolverError::new(format!("User {id} not found")))
                    })
                    .collect())
            }),
        )
        .argument(ArgumentDefinition::new("ids", ty("[ID!]!"))),
        field(
            "me",
            "User!",
            sync_resolver(|invocation: TestInvocation<'_>| {
                invocation.context.record_call();
                Ok(invocation
                    .context
                    .user("3")
                    .cloned()
                    .unwrap_or(Value::Null)
                    .into())
            }),
        ),
        field("failing", "String", failure("database unavailable")),
        field("requiredFailing", "String!", failure("quota exceeded")),
        field(
            "delayed",
            "String",
            resolver_fn(|invocation: TestInvocation<'_>| delayed(invocation).boxed()),
        )
        .argument(ArgumentDefinition::new("millis", ty("Int!"))),
        field(
            "slow",
            "String",
            resolver_fn(|invocation: TestInvocation<'_>| slow(invocation).boxed()),
        ),
    ];

    for field in fields {
        schema.register_field("Query", field).unwrap();
    }
}

fn register_mutation(schema: &mut TestSchema) {
    schema.register_object("Mutation").unwrap();

    schema
        .register_field(
            "Mutation",
            field(
                "append",
                "[String!]!",
                resolver_fn(|invocation: TestInvocation<'_>| append(invocation).boxed()),
            )
            .argument(ArgumentDefinition::new("entry", ty("String!")))
            .argument(ArgumentDefinition::new("delayMillis", ty("Int")).with_default(json!(0))),
        )
        .unwrap();

    schema
        .register_field(
            "Mutation",
            field(
                "increment",
                "Int!",
                sync_resolver(|invocation: TestInvocation<'_>| {
                    invocation.context.record_call();
                    let value = invocation.context.counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok(json!(value).into())
                }),
            ),
        )
        .unwrap();
}

fn register_user(schema: &mut TestSchema) {
    schema.register_object("User").unwrap();

    let fields = [
        field("id", "ID!", property_resolver("id")),
        field("name", "String!", property_resolver("name")),
        field("email", "String", property_resolver("email")),
        field(
            "manager",
            "User",
            sync_resolver(|invocation: TestInvocation<'_>| {
                let manager = invocation
                    .parent_property("managerId")
                    .as_str()
                    .and_then(|id| invocation.context.user(id))
                    .cloned()
                    .unwrap_or(Value::Null);
                Ok(manager.into())
            }),
        ),
        field(
            "friends",
            "[User!]",
            sync_resolver(|invocation: TestInvocation<'_>| {
                let friends = invocation
                    .parent_property("friendIds")
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|id| {
                        id.as_str()
                            .and_then(|id| invocation.context.user(id))
                            .cloned()
                            .unwrap_or(Value::Null)
                    })
                    .collect();
                Ok(Value::Array(friends).into())
            }),
        ),
    ];

    for field in fields {
        schema.register_field("User", field).unwrap();
    }
}

/// The schema with all types registered, not yet completed.
pub fn incomplete_test_schema(probe: &Probe) -> TestSchema {
    let probe = probe.clone();
    let mut schema = TestSchema::new().with_context_creator(move || probe.context());

    register_query(&mut schema);
    register_mutation(&mut schema);
    register_user(&mut schema);

    schema
}

pub fn test_schema_with_probe(probe: &Probe) -> TestSchema {
    let mut schema = incomplete_test_schema(probe);
    schema.complete().unwrap();
    schema
}

pub fn test_schema() -> TestSchema {
    test_schema_with_probe(&Probe::default())
}

pub fn test_executor(probe: &Probe) -> Executor<TestContext> {
    Executor::new(Arc::new(test_schema_with_probe(probe)))
}

pub fn test_executor_with_config(probe: &Probe, config: ExecutorConfig) -> Executor<TestContext> {
    Executor::with_config(Arc::new(test_schema_with_probe(probe)), config)
}
