// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Debug, Formatter};

use async_graphql_parser::types::OperationType;

use fieldwise_model::ObjectType;

use crate::validation::field::ValidatedField;

// Validated operation.
pub struct ValidatedOperation<'a, C, P> {
    pub name: Option<String>,
    /// The type of operation.
    pub typ: OperationType,
    /// `Query` or `Mutation`, matching `typ`.
    pub root_type: &'a ObjectType<C, P>,
    /// The operation's fields (individual queries or mutations).
    pub fields: Vec<ValidatedField<'a, C, P>>,
}

impl<C, P> Debug for ValidatedOperation<'_, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedOperation")
            .field("name", &self.name)
            .field("typ", &self.typ)
            .field("root_type", &self.root_type.name)
            .field("fields", &self.fields)
            .finish()
    }
}
