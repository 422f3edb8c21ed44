//! Convenient re-exports for common use.

pub use crate::definition::{TimeoutPolicy, WorkflowDef, WorkflowTask};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::executor::{
    ExecuteWorkflowRequest, ExecutorService, IdempotencyStrategy, StartWorkflowRequest,
    WorkflowExecutor, WorkflowRun, WorkflowStatus,
};
pub use crate::task::{
    DoWhileTask, DynamicForkTask, ForkTask, InlineSubWorkflowTask, JoinTask, SubWorkflowTask, Task,
    TaskNode, TaskType,
};
pub use crate::workflow::{ConductorWorkflow, ExecuteOptions, StartOptions};
