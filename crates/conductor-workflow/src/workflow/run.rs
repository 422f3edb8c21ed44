//! Registering and running a workflow through an executor.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::ConductorWorkflow;
use crate::Result;
use crate::executor::{
    DEFAULT_WAIT_FOR_SECONDS, ExecuteWorkflowRequest, ExecutorService, IdempotencyStrategy,
    StartWorkflowRequest, WorkflowRun,
};

/// Version the engine assigns to definitions run without registration.
const INLINE_EXECUTION_VERSION: u32 = 1;

/// Options of [`ConductorWorkflow::start_workflow_with_input`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartOptions {
    pub input: Map<String, Value>,
    pub correlation_id: Option<String>,
    pub task_to_domain: Option<BTreeMap<String, String>>,
    pub priority: Option<u32>,
    pub idempotency_key: Option<String>,
    pub idempotency_strategy: IdempotencyStrategy,
}

impl StartOptions {
    /// Sets the workflow input.
    #[must_use]
    pub fn with_input(mut self, input: Map<String, Value>) -> Self {
        self.input = input;
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Routes the named tasks to worker domains.
    #[must_use]
    pub fn with_task_to_domain(mut self, task_to_domain: BTreeMap<String, String>) -> Self {
        self.task_to_domain = Some(task_to_domain);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the idempotency key and what to do when it was already used.
    #[must_use]
    pub fn with_idempotency(
        mut self,
        key: impl Into<String>,
        strategy: IdempotencyStrategy,
    ) -> Self {
        self.idempotency_key = Some(key.into());
        self.idempotency_strategy = strategy;
        self
    }
}

/// Options of [`ConductorWorkflow::execute`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOptions {
    pub input: Map<String, Value>,
    pub wait_until_task_ref: Option<String>,
    pub wait_for_seconds: u32,
    pub request_id: Option<String>,
    pub idempotency_key: Option<String>,
    pub idempotency_strategy: IdempotencyStrategy,
    pub task_to_domain: Option<BTreeMap<String, String>>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            input: Map::new(),
            wait_until_task_ref: None,
            wait_for_seconds: DEFAULT_WAIT_FOR_SECONDS,
            request_id: None,
            idempotency_key: None,
            idempotency_strategy: IdempotencyStrategy::default(),
            task_to_domain: None,
        }
    }
}

impl ExecuteOptions {
    /// Sets the workflow input.
    #[must_use]
    pub fn with_input(mut self, input: Map<String, Value>) -> Self {
        self.input = input;
        self
    }

    /// Returns as soon as the task with this reference name has completed.
    #[must_use]
    pub fn with_wait_until_task_ref(mut self, reference_name: impl Into<String>) -> Self {
        self.wait_until_task_ref = Some(reference_name.into());
        self
    }

    /// Sets how long the server waits before answering.
    #[must_use]
    pub fn with_wait_for_seconds(mut self, wait_for_seconds: u32) -> Self {
        self.wait_for_seconds = wait_for_seconds;
        self
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the idempotency key and what to do when it was already used.
    #[must_use]
    pub fn with_idempotency(
        mut self,
        key: impl Into<String>,
        strategy: IdempotencyStrategy,
    ) -> Self {
        self.idempotency_key = Some(key.into());
        self.idempotency_strategy = strategy;
        self
    }

    /// Routes the named tasks to worker domains.
    #[must_use]
    pub fn with_task_to_domain(mut self, task_to_domain: BTreeMap<String, String>) -> Self {
        self.task_to_domain = Some(task_to_domain);
        self
    }
}

impl ConductorWorkflow {
    /// Registers the exported definition.
    ///
    /// Without `overwrite` the engine rejects a definition that differs from
    /// the one already registered under the same name and version.
    pub async fn register(&self, executor: &ExecutorService, overwrite: bool) -> Result<()> {
        executor
            .register_workflow(&self.to_workflow_def(), overwrite)
            .await
    }

    /// Starts a run of this definition without registering it.
    ///
    /// The request's name, version and definition are replaced by this
    /// workflow's; everything else is sent as given.
    pub async fn start_workflow(
        &self,
        executor: &ExecutorService,
        mut request: StartWorkflowRequest,
    ) -> Result<String> {
        request.name = self.name.clone();
        request.version = self.version;
        request.workflow_def = Some(self.to_workflow_def());

        executor.start_workflow(&request).await
    }

    /// Starts a run of this definition with the given options.
    pub async fn start_workflow_with_input(
        &self,
        executor: &ExecutorService,
        options: StartOptions,
    ) -> Result<String> {
        let request = StartWorkflowRequest {
            name: self.name.clone(),
            version: self.version,
            input: options.input,
            correlation_id: options.correlation_id,
            idempotency_key: options.idempotency_key,
            idempotency_strategy: options.idempotency_strategy,
            priority: options.priority,
            task_to_domain: options.task_to_domain,
            workflow_def: Some(self.to_workflow_def()),
        };

        executor.start_workflow(&request).await
    }

    /// Runs this definition and waits, within the option's bound, for the result.
    ///
    /// The returned run may still be active; check its status.
    pub async fn execute(
        &self,
        executor: &ExecutorService,
        options: ExecuteOptions,
    ) -> Result<WorkflowRun> {
        let definition = self.to_workflow_def();

        let mut request = StartWorkflowRequest::new(definition.name.clone());
        request.version = Some(INLINE_EXECUTION_VERSION);
        request.input = options.input;
        request.task_to_domain = options.task_to_domain;
        if let Some(key) = options.idempotency_key {
            request.idempotency_key = Some(key);
            request.idempotency_strategy = options.idempotency_strategy;
        }
        request.workflow_def = Some(definition);

        let mut execute = ExecuteWorkflowRequest::new(request)
            .with_wait_for_seconds(options.wait_for_seconds);
        execute.wait_until_task_ref = options.wait_until_task_ref;
        execute.request_id = options.request_id;

        executor.execute_workflow(&execute).await
    }
}
