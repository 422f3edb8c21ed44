//! Parallel branches and their joins.

use derive_more::{Deref, DerefMut};
use serde_json::Value;

use super::{Task, TaskNode, TaskType};
use crate::definition::WorkflowTask;
use crate::workflow::normalize;
use crate::{Error, Result};

/// Input key holding the task list of a dynamic fork.
pub const DYNAMIC_TASKS_PARAM: &str = "forkedTasks";

/// Input key holding the per-task inputs of a dynamic fork.
pub const DYNAMIC_TASKS_INPUT_PARAM: &str = "forkedTasksInputs";

/// A static `FORK_JOIN` running each branch in parallel.
///
/// Workflows insert the matching `JOIN` on export unless the fork is
/// immediately followed by one.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct ForkTask {
    #[deref]
    #[deref_mut]
    task: Task,
    branches: Vec<Vec<TaskNode>>,
}

impl ForkTask {
    /// Creates a fork over `branches`.
    ///
    /// Every branch must hold at least one task, since the join waits on the
    /// last task of each branch. A fork without branches is allowed.
    pub fn new(reference_name: impl Into<String>, branches: Vec<Vec<TaskNode>>) -> Result<Self> {
        let task = Task::new(reference_name, TaskType::ForkJoin)?;

        if let Some(index) = branches.iter().position(Vec::is_empty) {
            return Err(Error::invalid_structure().with_message(format!(
                "branch {index} of fork '{}' has no tasks",
                task.reference_name()
            )));
        }

        Ok(Self { task, branches })
    }

    /// Returns the branches in order.
    pub fn branches(&self) -> &[Vec<TaskNode>] {
        &self.branches
    }

    /// Converts this fork into its primitive form with every branch normalized.
    pub fn to_workflow_task(&self) -> WorkflowTask {
        let mut task = self.task.to_workflow_task();
        task.fork_tasks = Some(self.branches.iter().map(|b| normalize(b)).collect());
        task
    }
}

/// A `JOIN` waiting on the listed reference names.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct JoinTask {
    #[deref]
    #[deref_mut]
    task: Task,
    join_on: Vec<String>,
}

impl JoinTask {
    /// Creates a join waiting on `join_on`, in order.
    pub fn new(reference_name: impl Into<String>, join_on: Vec<String>) -> Result<Self> {
        Ok(Self {
            task: Task::new(reference_name, TaskType::Join)?,
            join_on,
        })
    }

    /// Returns the reference names this join waits on.
    pub fn join_on(&self) -> &[String] {
        &self.join_on
    }

    /// Converts this node into its primitive wire form.
    pub fn to_workflow_task(&self) -> WorkflowTask {
        let mut task = self.task.to_workflow_task();
        task.join_on = Some(self.join_on.clone());
        task
    }
}

/// A `FORK_JOIN_DYNAMIC` whose branches are decided at run time.
///
/// The task list and the per-task inputs are read from the expressions set as
/// the `forkedTasks` and `forkedTasksInputs` inputs. Always exported together
/// with its own join, by default `<ref>_join`.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct DynamicForkTask {
    #[deref]
    #[deref_mut]
    task: Task,
    join: JoinTask,
}

impl DynamicForkTask {
    /// Creates a dynamic fork reading its tasks and their inputs from the
    /// given values, usually reference expressions.
    pub fn new(
        reference_name: impl Into<String>,
        forked_tasks: impl Into<Value>,
        forked_tasks_inputs: impl Into<Value>,
    ) -> Result<Self> {
        let task = Task::new(reference_name, TaskType::ForkJoinDynamic)?
            .with_input(DYNAMIC_TASKS_PARAM, forked_tasks)
            .with_input(DYNAMIC_TASKS_INPUT_PARAM, forked_tasks_inputs);
        let join = JoinTask::new(format!("{}_join", task.reference_name()), Vec::new())?;

        Ok(Self { task, join })
    }

    /// Creates a dynamic fork fed by the output of `pre_fork`.
    ///
    /// `pre_fork` is expected to produce `forkedTasks` and `forkedTasksInputs`.
    pub fn from_task(reference_name: impl Into<String>, pre_fork: &Task) -> Result<Self> {
        Self::new(
            reference_name,
            pre_fork.output(DYNAMIC_TASKS_PARAM),
            pre_fork.output(DYNAMIC_TASKS_INPUT_PARAM),
        )
    }

    /// Replaces the generated join.
    #[must_use]
    pub fn with_join(mut self, join: JoinTask) -> Self {
        self.join = join;
        self
    }

    /// Returns the join emitted after the fork.
    pub fn join(&self) -> &JoinTask {
        &self.join
    }

    /// Returns the fork followed by its join.
    pub fn to_workflow_tasks(&self) -> Vec<WorkflowTask> {
        let mut fork = self.task.to_workflow_task();
        fork.dynamic_fork_tasks_param = Some(DYNAMIC_TASKS_PARAM.to_owned());
        fork.dynamic_fork_tasks_input_param_name = Some(DYNAMIC_TASKS_INPUT_PARAM.to_owned());

        vec![fork, self.join.to_workflow_task()]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    fn simple(reference_name: &str) -> TaskNode {
        Task::simple(reference_name, reference_name).unwrap().into()
    }

    #[test]
    fn test_empty_branch_is_rejected() {
        let error = ForkTask::new("fork", vec![vec![simple("a")], vec![]]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidStructure);
    }

    #[test]
    fn test_zero_branches_allowed() {
        let fork = ForkTask::new("fork", vec![]).unwrap();
        assert_eq!(fork.to_workflow_task().fork_tasks, Some(vec![]));
    }

    #[test]
    fn test_branches_keep_boundaries() {
        let fork = ForkTask::new("fork", vec![vec![simple("a")], vec![simple("b"), simple("c")]]).unwrap();

        let branches = fork.to_workflow_task().fork_tasks.unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].len(), 1);
        assert_eq!(branches[1][1].task_reference_name, "c");
    }

    #[test]
    fn test_join_wire_form() {
        let join = JoinTask::new("join", vec!["a".into(), "c".into()]).unwrap();
        let value = serde_json::to_value(join.to_workflow_task()).unwrap();

        assert_eq!(value["type"], json!("JOIN"));
        assert_eq!(value["joinOn"], json!(["a", "c"]));
    }

    #[test]
    fn test_dynamic_fork_expansion() {
        let prepare = Task::simple("prepare", "prepare").unwrap();
        let fork = DynamicForkTask::from_task("fan_out", &prepare).unwrap();

        let tasks = fork.to_workflow_tasks();
        assert_eq!(tasks.len(), 2);

        let head = &tasks[0];
        assert_eq!(head.task_type, "FORK_JOIN_DYNAMIC");
        assert_eq!(head.dynamic_fork_tasks_param.as_deref(), Some("forkedTasks"));
        assert_eq!(
            head.dynamic_fork_tasks_input_param_name.as_deref(),
            Some("forkedTasksInputs")
        );
        assert_eq!(
            head.input_parameters.get("forkedTasks"),
            Some(&json!("${prepare.output.forkedTasks}"))
        );
        assert_eq!(tasks[1].task_reference_name, "fan_out_join");
    }

    #[test]
    fn test_dynamic_fork_custom_join() {
        let join = JoinTask::new("wait_all", vec![]).unwrap();
        let fork = DynamicForkTask::new("fan_out", "${a.output.t}", "${a.output.i}")
            .unwrap()
            .with_join(join);

        assert_eq!(fork.join().reference_name(), "wait_all");
    }
}
