// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0}")]
    QueryParsingFailed(String, Pos, Option<Pos>),

    #[error("Fragment definition '{0}' not found")]
    FragmentDefinitionNotFound(String, Pos),

    #[error("Fragment '{0}' spreads itself")]
    FragmentCycle(String, Pos),

    #[error("Fragment on '{0}' cannot be spread within type '{1}'")]
    FragmentTypeMismatch(String, String, Pos),

    #[error("No such operation '{0}'")]
    OperationNotFound(String, Pos),

    #[error("Field '{0}' is not valid for type '{1}'")]
    InvalidField(String, String, Pos),

    #[error("Field '{0}' is of a scalar type, which should not specify fields")]
    ScalarWithField(String, Pos),

    #[error("Field '{0}' of type '{1}' must have a selection of subfields")]
    ObjectWithoutFields(String, String, Pos),

    #[error("Field type '{0}' is not valid")]
    InvalidFieldType(String, Pos),

    #[error("Required argument '{0}' not found")]
    RequiredArgumentNotFound(String, Pos),

    #[error("Argument(s) '{0:?}' invalid for '{1}'")]
    StrayArguments(Vec<String>, String, Pos),

    #[error(
        "Argument '{argument_name}' is not of a valid type. Expected '{expected_type}', got '{actual_type}'"
    )]
    InvalidArgumentType {
        argument_name: String,
        expected_type: String,
        actual_type: String,
        pos: Pos,
    },

    #[error("Argument '{argument_name}' has an invalid value: {message}")]
    InvalidArgumentValue {
        argument_name: String,
        message: String,
        pos: Pos,
    },

    #[error("Fields with response key '{0}' select different fields or arguments")]
    UnmergeableFields(String, Pos),

    #[error("Selection set too deep")]
    SelectionSetTooDeep(Pos),

    #[error("No operation found")]
    NoOperationFound,

    #[error("Operation name required when document has more than one operation")]
    MultipleOperations,

    #[error("Subscriptions are not supported")]
    SubscriptionNotSupported(Pos),

    #[error("Variables are not supported")]
    VariablesNotSupported(Pos),

    #[error("Directive '@{0}' is not supported")]
    DirectiveNotSupported(String, Pos),
}

impl ValidationError {
    pub fn position1(&self) -> Pos {
        match self {
            ValidationError::QueryParsingFailed(_, pos, _) => *pos,
            ValidationError::FragmentDefinitionNotFound(_, pos) => *pos,
            ValidationError::FragmentCycle(_, pos) => *pos,
            ValidationError::FragmentTypeMismatch(_, _, pos) => *pos,
            ValidationError::OperationNotFound(_, pos) => *pos,
            ValidationError::InvalidField(_, _, pos) => *pos,
            ValidationError::ScalarWithField(_, pos) => *pos,
            ValidationError::ObjectWithoutFields(_, _, pos) => *pos,
            ValidationError::InvalidFieldType(_, pos) => *pos,
            ValidationError::RequiredArgumentNotFound(_, pos) => *pos,
            ValidationError::StrayArguments(_, _, pos) => *pos,
            ValidationError::InvalidArgumentType { pos, .. } => *pos,
            ValidationError::InvalidArgumentValue { pos, .. } => *pos,
            ValidationError::UnmergeableFields(_, pos) => *pos,
            ValidationError::SelectionSetTooDeep(pos) => *pos,
            ValidationError::NoOperationFound => Pos::default(),
            ValidationError::MultipleOperations => Pos::default(),
            ValidationError::SubscriptionNotSupported(pos) => *pos,
            ValidationError::VariablesNotSupported(pos) => *pos,
            ValidationError::DirectiveNotSupported(_, pos) => *pos,
        }
    }

    pub fn position2(&self) -> Option<Pos> {
        match self {
            ValidationError::QueryParsingFailed(_, _, pos) => *pos,
            _ => None,
        }
    }

    /// Whether the query text itself is malformed, as opposed to not matching the schema.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, ValidationError::QueryParsingFailed(..))
    }
}
