//! Executor service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{
    ExecuteWorkflowRequest, StartWorkflowRequest, TRACING_TARGET, WorkflowExecutor, WorkflowRun,
};
use crate::Result;
use crate::definition::WorkflowDef;

/// Executor wrapper with observability.
///
/// This wrapper adds structured logging to any executor implementation.
/// The inner executor is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct ExecutorService {
    inner: Arc<dyn WorkflowExecutor>,
}

impl fmt::Debug for ExecutorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorService").finish_non_exhaustive()
    }
}

impl ExecutorService {
    /// Create a new executor service wrapper.
    pub fn new<E>(executor: E) -> Self
    where
        E: WorkflowExecutor + 'static,
    {
        Self {
            inner: Arc::new(executor),
        }
    }

    /// Create a service from an already shared executor.
    pub fn from_shared(executor: Arc<dyn WorkflowExecutor>) -> Self {
        Self { inner: executor }
    }

    /// Registers a workflow definition.
    pub async fn register_workflow(&self, definition: &WorkflowDef, overwrite: bool) -> Result<()> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %definition.name,
            version = ?definition.version,
            task_count = definition.tasks.len(),
            overwrite,
            "Registering workflow"
        );

        let result = self.inner.register_workflow(definition, overwrite).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    workflow = %definition.name,
                    elapsed_ms = elapsed.as_millis(),
                    "Workflow registered"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    workflow = %definition.name,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Workflow registration failed"
                );
            }
        }

        result
    }

    /// Starts a workflow run and returns its id.
    pub async fn start_workflow(&self, request: &StartWorkflowRequest) -> Result<String> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %request.name,
            version = ?request.version,
            correlation_id = ?request.correlation_id,
            inline_definition = request.workflow_def.is_some(),
            "Starting workflow"
        );

        let result = self.inner.start_workflow(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(workflow_id) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    workflow = %request.name,
                    workflow_id = %workflow_id,
                    elapsed_ms = elapsed.as_millis(),
                    "Workflow started"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    workflow = %request.name,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Workflow start failed"
                );
            }
        }

        result
    }

    /// Runs a workflow and waits for its result.
    pub async fn execute_workflow(&self, request: &ExecuteWorkflowRequest) -> Result<WorkflowRun> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %request.request.name,
            wait_for_seconds = request.wait_for_seconds,
            wait_until_task_ref = ?request.wait_until_task_ref,
            request_id = ?request.request_id,
            "Executing workflow"
        );

        let result = self.inner.execute_workflow(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(run) if run.status.is_terminal() => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    workflow = %request.request.name,
                    workflow_id = %run.workflow_id,
                    status = %run.status,
                    elapsed_ms = elapsed.as_millis(),
                    "Workflow execution finished"
                );
            }
            Ok(run) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    workflow = %request.request.name,
                    workflow_id = %run.workflow_id,
                    status = %run.status,
                    elapsed_ms = elapsed.as_millis(),
                    "Workflow still active after wait bound"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    workflow = %request.request.name,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Workflow execution failed"
                );
            }
        }

        result
    }
}
