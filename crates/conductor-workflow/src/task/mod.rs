//! Task nodes and the composite constructs built from them.
//!
//! [`Task`] is the single node type every variant wraps. [`TaskNode`] is the
//! closed set of variants a workflow holds; each variant expands into one or
//! more primitive [`WorkflowTask`]s on export.

mod base;
mod do_while;
mod fork;
mod kind;
mod llm;
mod sub_workflow;

use derive_more::From;

pub use self::base::{Task, validate_reference_name};
pub use self::do_while::{DoWhileTask, loop_condition};
pub use self::fork::{DynamicForkTask, ForkTask, JoinTask};
pub use self::kind::TaskType;
pub use self::llm::EmbeddingModel;
pub use self::sub_workflow::{InlineSubWorkflowTask, SubWorkflowTask};
use crate::definition::WorkflowTask;

/// Any node that can be placed in a workflow.
#[derive(Debug, Clone, PartialEq, From)]
pub enum TaskNode {
    /// A plain task without nested structure.
    Simple(Task),
    /// A loop over a nested task list.
    DoWhile(DoWhileTask),
    /// Parallel branches, joined on export unless a join follows.
    Fork(ForkTask),
    /// An explicit join.
    Join(JoinTask),
    /// A fork whose branches are chosen at run time. Expands to a fork and its join.
    DynamicFork(DynamicForkTask),
    /// A sub-workflow referenced by name and version.
    SubWorkflow(SubWorkflowTask),
    /// A sub-workflow embedded by definition.
    InlineSubWorkflow(InlineSubWorkflowTask),
}

impl TaskNode {
    /// Returns the task shared by every variant.
    pub fn task(&self) -> &Task {
        match self {
            Self::Simple(task) => task,
            Self::DoWhile(node) => &**node,
            Self::Fork(node) => &**node,
            Self::Join(node) => &**node,
            Self::DynamicFork(node) => &**node,
            Self::SubWorkflow(node) => &**node,
            Self::InlineSubWorkflow(node) => &**node,
        }
    }

    /// Returns the task type of the node.
    pub fn kind(&self) -> TaskType {
        self.task().kind()
    }

    /// Returns the reference name of the node.
    pub fn reference_name(&self) -> &str {
        self.task().reference_name()
    }

    /// Returns an expression addressing this node's output.
    pub fn output<'a>(&self, path: impl Into<Option<&'a str>>) -> String {
        self.task().output(path)
    }

    /// Expands this node into primitive tasks.
    ///
    /// Every variant yields exactly one primitive except dynamic forks, which
    /// yield the fork followed by its join.
    pub fn expand(&self) -> Vec<WorkflowTask> {
        match self {
            Self::Simple(task) => vec![task.to_workflow_task()],
            Self::DoWhile(task) => vec![task.to_workflow_task()],
            Self::Fork(task) => vec![task.to_workflow_task()],
            Self::Join(task) => vec![task.to_workflow_task()],
            Self::DynamicFork(task) => task.to_workflow_tasks(),
            Self::SubWorkflow(task) => vec![task.to_workflow_task()],
            Self::InlineSubWorkflow(task) => vec![task.to_workflow_task()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_from_variants() {
        let simple: TaskNode = Task::simple("fetch", "fetch").unwrap().into();
        let join: TaskNode = JoinTask::new("join", vec!["fetch".into()]).unwrap().into();

        assert_eq!(simple.kind(), TaskType::Simple);
        assert_eq!(join.kind(), TaskType::Join);
        assert_eq!(join.reference_name(), "join");
        assert_eq!(simple.output("id"), "${fetch.output.id}");
    }

    #[test]
    fn test_expand_counts() {
        let simple: TaskNode = Task::simple("fetch", "fetch").unwrap().into();
        let dynamic: TaskNode = DynamicForkTask::new("fan", "${x.output.tasks}", "${x.output.inputs}")
            .unwrap()
            .into();

        assert_eq!(simple.expand().len(), 1);

        let expanded = dynamic.expand();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].kind(), Some(TaskType::ForkJoinDynamic));
        assert!(expanded[1].is_join());
    }
}
