//! Submission of definitions and runs to the engine.
//!
//! The core never talks to the engine itself. [`WorkflowExecutor`] is the
//! seam implemented by transport crates, and [`ExecutorService`] wraps any
//! implementation with structured logging.

mod request;
mod response;
mod service;

pub use self::request::{
    DEFAULT_WAIT_FOR_SECONDS, ExecuteWorkflowRequest, IdempotencyStrategy, StartWorkflowRequest,
    StartWorkflowRequestBuilder, StartWorkflowRequestError,
};
pub use self::response::{TaskRun, WorkflowRun, WorkflowStatus};
pub use self::service::ExecutorService;
use crate::Result;
use crate::definition::WorkflowDef;

/// Tracing target for executor operations.
pub const TRACING_TARGET: &str = "conductor_workflow::executor";

/// Core trait for registering and running workflows on an engine.
///
/// Implement this trait to connect the builder to a transport.
#[async_trait::async_trait]
pub trait WorkflowExecutor: Send + Sync {
    /// Registers a definition.
    ///
    /// Without `overwrite` the engine rejects a definition that differs from
    /// the registered one with the same name and version.
    async fn register_workflow(&self, definition: &WorkflowDef, overwrite: bool) -> Result<()>;

    /// Starts a run and returns its id.
    async fn start_workflow(&self, request: &StartWorkflowRequest) -> Result<String>;

    /// Starts a run and waits, within the request's bound, for its result.
    async fn execute_workflow(&self, request: &ExecuteWorkflowRequest) -> Result<WorkflowRun>;
}
