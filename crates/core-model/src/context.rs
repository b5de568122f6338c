// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

/// A caller-defined value shared (by reference) with every resolver of one execution.
///
/// The executor never touches the context besides handing it to resolvers. Once all fields of an
/// execution have settled (successfully or not), the executor calls [`ExecutionContext::release`]
/// exactly once. Contexts holding resources such as connections or transactions override it;
/// everyone else gets the no-op default.
pub trait ExecutionContext: Send + Sync {
    fn release(&mut self) {}
}

impl ExecutionContext for () {}

/// Execution parameters for schemas that do not use any.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoExecutionParameters;
