//! Requests sent to a workflow executor.

use std::collections::BTreeMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::definition::WorkflowDef;

/// Default number of seconds a synchronous execution waits for completion.
pub const DEFAULT_WAIT_FOR_SECONDS: u32 = 10;

/// How the engine treats a start request whose idempotency key was already used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum IdempotencyStrategy {
    /// Reject the request.
    #[default]
    Fail,
    /// Return the id of the existing run.
    ReturnExisting,
}

/// Request to start a workflow run.
///
/// When `workflow_def` is set the engine runs that definition without it
/// being registered first.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(
    name = "StartWorkflowRequestBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(private, name = "build_inner", error = "StartWorkflowRequestError")
)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowRequest {
    /// Name of the workflow to start.
    pub name: String,
    /// Version to start. `None` starts the latest registered version.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Workflow input.
    #[builder(default)]
    #[serde(default)]
    pub input: Map<String, Value>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub idempotency_strategy: IdempotencyStrategy,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Task name to worker domain routing.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_to_domain: Option<BTreeMap<String, String>>,
    /// Definition to run in place of a registered one.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_def: Option<WorkflowDef>,
}

/// Error type for StartWorkflowRequest builder.
pub type StartWorkflowRequestError = derive_builder::UninitializedFieldError;

impl StartWorkflowRequestBuilder {
    /// Build the request.
    pub fn build(self) -> Result<StartWorkflowRequest, StartWorkflowRequestError> {
        self.build_inner()
    }
}

impl StartWorkflowRequest {
    /// Creates a request starting the latest version of `name` with no input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            input: Map::new(),
            correlation_id: None,
            idempotency_key: None,
            idempotency_strategy: IdempotencyStrategy::default(),
            priority: None,
            task_to_domain: None,
            workflow_def: None,
        }
    }

    /// Returns a builder for the request.
    pub fn builder() -> StartWorkflowRequestBuilder {
        StartWorkflowRequestBuilder::default()
    }
}

/// Request to run a workflow and wait for its result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteWorkflowRequest {
    /// The run to start.
    pub request: StartWorkflowRequest,
    /// Return as soon as this task completes instead of waiting for the run.
    pub wait_until_task_ref: Option<String>,
    /// Upper bound on how long the engine holds the call open.
    pub wait_for_seconds: u32,
    /// Caller-supplied id of this execution. Generated by the client if unset.
    pub request_id: Option<String>,
}

impl ExecuteWorkflowRequest {
    /// Wraps `request` with the default wait bound and no wait-until task.
    pub fn new(request: StartWorkflowRequest) -> Self {
        Self {
            request,
            wait_until_task_ref: None,
            wait_for_seconds: DEFAULT_WAIT_FOR_SECONDS,
            request_id: None,
        }
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
}
