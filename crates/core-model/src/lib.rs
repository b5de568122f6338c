// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The schema model: types, fields, arguments and the resolvers bound to them.
//!
//! A [`Schema`] is built up with `register_*` calls and then sealed with [`Schema::complete`],
//! after which it is read-only and can be shared between concurrent executions.

pub mod context;
pub mod definition;
pub mod resolver;
pub mod scalar;
pub mod schema;
pub mod types;

pub use context::{ExecutionContext, NoExecutionParameters};
pub use definition::{ArgumentDefinition, FieldDefinition, ObjectType, TypeDefinition};
pub use resolver::{
    Invocation, RawValue, Resolver, ResolverError, ResolverResult, property_resolver,
    resolver_fn, sync_resolver,
};
pub use scalar::ScalarType;
pub use schema::{MUTATION_ROOT_TYPENAME, QUERY_ROOT_TYPENAME, Schema, SchemaError};
pub use types::FieldType;
