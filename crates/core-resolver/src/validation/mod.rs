// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Bind a query to a schema.
//!
//! Take a user submitted query, parse it and transform it into a validated selection tree (in the
//! process, validate the query against the schema).

use async_graphql_parser::{Pos, types::ExecutableDocument};
use tracing::error;

pub mod document_validator;
pub mod field;
pub mod operation;
pub mod validation_error;

mod arguments_validator;
mod operation_validator;
mod selection_set_validator;

use validation_error::ValidationError;

pub fn parse_query(query: &str) -> Result<ExecutableDocument, ValidationError> {
    async_graphql_parser::parse_query(query).map_err(|error| {
        error!(%error, "Failed to parse query");
        let (message, pos1, pos2) = match error {
            async_graphql_parser::Error::Syntax {
                message,
                start,
                end,
            } => (format!("Syntax error: {}", message.trim_end()), start, end),
            async_graphql_parser::Error::MultipleOperations {
                anonymous,
                operation,
            } => (
                ValidationError::MultipleOperations.to_string(),
                anonymous,
                Some(operation),
            ),
            async_graphql_parser::Error::OperationDuplicated {
                operation,
                first,
                second,
            } => (
                format!("Operation {operation} duplicated"),
                first,
                Some(second),
            ),
            async_graphql_parser::Error::FragmentDuplicated {
                fragment,
                first,
                second,
            } => (
                format!("Fragment {fragment} duplicated"),
                first,
                Some(second),
            ),
            async_graphql_parser::Error::MissingOperation => {
                ("Missing operation".to_string(), Pos::default(), None)
            }
            _ => ("Unknown error".to_string(), Pos::default(), None),
        };

        ValidationError::QueryParsingFailed(message, pos1, pos2)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error() {
        let error = parse_query("{ hello ").unwrap_err();

        assert!(error.is_syntax_error());
        assert!(error.to_string().starts_with("Syntax error"));
        assert_eq!(error.position1().line, 1);
    }

    #[test]
    fn anonymous_and_named_operations() {
        let error = parse_query("{ hello } query Named { hello }").unwrap_err();

        assert_eq!(
            error.to_string(),
            "Operation name required when document has more than one operation"
        );
        assert!(error.position2().is_some());
    }

    #[test]
    fn valid_document() {
        assert!(parse_query("query { hello }").is_ok());
    }
}
