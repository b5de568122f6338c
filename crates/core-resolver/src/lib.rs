// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Query execution over a [`fieldwise_model::Schema`].
//!
//! A query is parsed and bound to the schema ([`validation`]), then the bound selection tree is
//! walked by the field executor, which calls resolvers, completes their values against the
//! declared field types and assembles a [`QueryResponse`]. Field-level failures null out the
//! nearest nullable position and are reported alongside the data; anything that prevents
//! producing data at all is an [`ExecutionError`].

pub mod config;
pub mod execution_error;
pub mod executor;
pub mod response;
pub mod validation;

mod coercion;
mod field_executor;
mod test_support;

pub use config::{ExecutorConfig, FieldExecution};
pub use execution_error::ExecutionError;
pub use executor::{ExecutionRequest, Executor};
pub use response::{FieldError, FieldErrorKind, PathSegment, QueryResponse, ResponsePath};
pub use validation::validation_error::ValidationError;
