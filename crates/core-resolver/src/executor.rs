// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::ops::Deref;
use std::sync::Arc;

use async_graphql_parser::types::OperationType;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use fieldwise_model::{ExecutionContext, NoExecutionParameters, Schema};

use crate::{
    config::{ExecutorConfig, FieldExecution},
    execution_error::ExecutionError,
    field_executor::{FieldExecutor, NullBubble},
    response::{QueryResponse, ResponsePath},
    validation::{
        document_validator::DocumentValidator, operation::ValidatedOperation, parse_query,
        validation_error::ValidationError,
    },
};

/// One query to execute.
///
/// Without an explicit context, the schema's context creator supplies one.
pub struct ExecutionRequest<C, P = NoExecutionParameters> {
    pub query: String,
    pub context: Option<C>,
    pub parameters: P,
}

impl<C, P> ExecutionRequest<C, P> {
    pub fn new(query: impl Into<String>, parameters: P) -> Self {
        Self {
            query: query.into(),
            context: None,
            parameters,
        }
    }

    pub fn with_context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }
}

/// Runs queries against a completed schema.
///
/// The executor is cheap to clone and may run any number of queries concurrently; each execution
/// gets its own context.
pub struct Executor<C, P = NoExecutionParameters> {
    schema: Arc<Schema<C, P>>,
    config: ExecutorConfig,
}

impl<C, P> Clone for Executor<C, P> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C, P> Executor<C, P>
where
    C: ExecutionContext,
    P: Send + Sync,
{
    pub fn new(schema: Arc<Schema<C, P>>) -> Self {
        Self::with_config(schema, ExecutorConfig::default())
    }

    pub fn with_config(schema: Arc<Schema<C, P>>, config: ExecutorConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &Schema<C, P> {
        &self.schema
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute with a context from the schema's context creator.
    pub async fn execute_query(
        &self,
        query: &str,
        parameters: P,
    ) -> Result<QueryResponse, ExecutionError> {
        self.execute(
            ExecutionRequest::new(query, parameters),
            CancellationToken::new(),
        )
        .await
    }

    /// Execute with a caller supplied context. The context is released when execution ends.
    pub async fn execute_query_with_context(
        &self,
        query: &str,
        context: C,
        parameters: P,
    ) -> Result<QueryResponse, ExecutionError> {
        self.execute(
            ExecutionRequest::new(query, parameters).with_context(context),
            CancellationToken::new(),
        )
        .await
    }

    /// Execute a request, giving up as soon as `cancellation` is triggered or the configured
    /// timeout elapses. In-flight resolvers are dropped in that case and no partial data is
    /// returned.
    ///
    /// The context (supplied or created) is released exactly once, after every resolver future of
    /// the execution has completed or been dropped, whatever the outcome.
    #[instrument(name = "Executor::execute", skip(self, request, cancellation))]
    pub async fn execute(
        &self,
        request: ExecutionRequest<C, P>,
        cancellation: CancellationToken,
    ) -> Result<QueryResponse, ExecutionError> {
        let ExecutionRequest {
            query,
            context,
            parameters,
        } = request;

        let supplied_context = context.map(ContextGuard);

        if !self.schema.is_complete() {
            return Err(ExecutionError::SchemaIncomplete);
        }

        let context = match supplied_context {
            Some(context) => context,
            None => ContextGuard(
                self.schema
                    .create_context()
                    .ok_or(ExecutionError::MissingContext)?,
            ),
        };

        let operation = self.validate(&query)?;
        debug!(operation_name = ?operation.name, operation_type = ?operation.typ, "Executing operation");

        let execution = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::timeout(
                    timeout,
                    self.execute_operation(&operation, &context, &parameters),
                )
                .await
                .unwrap_or_else(|_| {
                    Err(ExecutionError::Cancelled(format!(
                        "timed out after {timeout:?}"
                    )))
                }),
                None => {
                    self.execute_operation(&operation, &context, &parameters)
                        .await
                }
            }
        };

        tokio::select! {
            biased;

            _ = cancellation.cancelled() => {
                Err(ExecutionError::Cancelled("cancelled by caller".to_string()))
            }
            result = execution => result,
        }
    }

    #[instrument(name = "Executor::validate", skip(self, query))]
    fn validate(&self, query: &str) -> Result<ValidatedOperation<'_, C, P>, ValidationError> {
        let document = parse_query(query)?;

        DocumentValidator::new(self.schema(), self.config.max_selection_depth).validate(document)
    }

    async fn execute_operation(
        &self,
        operation: &ValidatedOperation<'_, C, P>,
        context: &C,
        parameters: &P,
    ) -> Result<QueryResponse, ExecutionError> {
        let field_executor = FieldExecutor::new(
            self.schema(),
            context,
            parameters,
            self.config.field_execution,
        );

        let root_execution = match operation.typ {
            OperationType::Mutation => FieldExecution::Serial,
            _ => self.config.field_execution,
        };

        let root_value = Value::Null;
        let mut errors = vec![];

        let data = field_executor
            .execute_selection_set(
                operation.root_type,
                &operation.fields,
                &root_value,
                &ResponsePath::root(),
                root_execution,
                &mut errors,
            )
            .await;

        match data {
            Ok(data) => Ok(QueryResponse { data, errors }),
            Err(NullBubble) => {
                warn!(error_count = errors.len(), "Null propagated to the root");
                Err(ExecutionError::NullRoot { errors })
            }
        }
    }
}

impl<C> Executor<C, NoExecutionParameters>
where
    C: ExecutionContext,
{
    pub async fn run(&self, query: &str) -> Result<QueryResponse, ExecutionError> {
        self.execute_query(query, NoExecutionParameters).await
    }

    pub async fn run_with_context(
        &self,
        query: &str,
        context: C,
    ) -> Result<QueryResponse, ExecutionError> {
        self.execute_query_with_context(query, context, NoExecutionParameters)
            .await
    }
}

/// Releases the context when dropped, which covers early returns, cancellation and panics alike.
struct ContextGuard<C: ExecutionContext>(C);

impl<C: ExecutionContext> Deref for ContextGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.0
    }
}

impl<C: ExecutionContext> Drop for ContextGuard<C> {
    fn drop(&mut self) {
        self.0.release();
    }
}
