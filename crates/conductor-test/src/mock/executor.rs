//! Mock workflow executor.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
#[cfg(feature = "config")]
use clap::Args;
use conductor_workflow::definition::WorkflowDef;
use conductor_workflow::executor::{
    ExecuteWorkflowRequest, ExecutorService, StartWorkflowRequest, WorkflowExecutor, WorkflowRun,
    WorkflowStatus,
};
use conductor_workflow::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Configuration for the mock executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MockExecutorConfig {
    /// Status reported by synchronous executions
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-run-status", default_value = "COMPLETED")
    )]
    #[serde(default = "default_run_status")]
    pub run_status: WorkflowStatus,

    /// Fail every call with this error kind instead of answering
    #[cfg_attr(feature = "config", arg(long = "mock-fail-with"))]
    #[serde(default)]
    pub fail_with: Option<ErrorKind>,
}

fn default_run_status() -> WorkflowStatus {
    WorkflowStatus::Completed
}

impl Default for MockExecutorConfig {
    fn default() -> Self {
        Self {
            run_status: default_run_status(),
            fail_with: None,
        }
    }
}

impl MockExecutorConfig {
    /// Set the status reported by synchronous executions.
    #[must_use]
    pub fn with_run_status(mut self, run_status: WorkflowStatus) -> Self {
        self.run_status = run_status;
        self
    }

    /// Make every call fail with the given error kind.
    #[must_use]
    pub fn with_failure(mut self, kind: ErrorKind) -> Self {
        self.fail_with = Some(kind);
        self
    }
}

#[derive(Debug, Default)]
struct Recording {
    registered: Vec<(WorkflowDef, bool)>,
    started: Vec<StartWorkflowRequest>,
    executed: Vec<ExecuteWorkflowRequest>,
}

/// Mock workflow executor for testing.
///
/// Records every call it receives. Clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct MockWorkflowExecutor {
    config: MockExecutorConfig,
    recording: Arc<Mutex<Recording>>,
}

impl MockWorkflowExecutor {
    /// Creates a new mock executor with the given configuration.
    pub fn new(config: MockExecutorConfig) -> Self {
        Self {
            config,
            recording: Arc::default(),
        }
    }

    /// Gets the executor configuration.
    pub fn config(&self) -> &MockExecutorConfig {
        &self.config
    }

    /// Wraps a clone of this executor into an [`ExecutorService`].
    pub fn into_service(self) -> ExecutorService {
        ExecutorService::new(self)
    }

    /// Returns the definitions registered so far with their overwrite flag.
    pub fn registered(&self) -> Vec<(WorkflowDef, bool)> {
        self.lock().registered.clone()
    }

    /// Returns the start requests received so far.
    pub fn started(&self) -> Vec<StartWorkflowRequest> {
        self.lock().started.clone()
    }

    /// Returns the execute requests received so far.
    pub fn executed(&self) -> Vec<ExecuteWorkflowRequest> {
        self.lock().executed.clone()
    }

    /// Forgets every recorded call.
    pub fn reset(&self) {
        *self.lock() = Recording::default();
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failure(&self) -> Result<()> {
        match self.config.fail_with {
            Some(kind) => Err(Error::new(kind).with_message("Mock executor configured to fail")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkflowExecutor for MockWorkflowExecutor {
    async fn register_workflow(&self, definition: &WorkflowDef, overwrite: bool) -> Result<()> {
        self.check_failure()?;
        self.lock().registered.push((definition.clone(), overwrite));
        Ok(())
    }

    async fn start_workflow(&self, request: &StartWorkflowRequest) -> Result<String> {
        self.check_failure()?;
        self.lock().started.push(request.clone());
        Ok(Uuid::now_v7().to_string())
    }

    async fn execute_workflow(&self, request: &ExecuteWorkflowRequest) -> Result<WorkflowRun> {
        self.check_failure()?;
        self.lock().executed.push(request.clone());

        let start = &request.request;
        Ok(WorkflowRun {
            workflow_id: Uuid::now_v7().to_string(),
            status: self.config.run_status,
            input: start.input.clone(),
            correlation_id: start.correlation_id.clone(),
            request_id: request.request_id.clone(),
            ..WorkflowRun::default()
        })
    }
}
