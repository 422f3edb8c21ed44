//! Loop constructs.

use derive_more::{Deref, DerefMut};
use serde_json::Value;

use super::{Task, TaskNode, TaskType};
use crate::Result;
use crate::definition::WorkflowTask;
use crate::workflow::normalize;

/// Returns the loop condition that stops after `iterations` rounds of `reference_name`.
pub fn loop_condition(reference_name: &str, iterations: u32) -> String {
    format!("if ( $.{reference_name}.iteration < {iterations} ) {{ true; }} else {{ false; }}")
}

/// A `DO_WHILE` loop repeating its body while the condition holds.
///
/// The condition is an engine-side script and is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct DoWhileTask {
    #[deref]
    #[deref_mut]
    task: Task,
    loop_condition: String,
    loop_over: Vec<TaskNode>,
}

impl DoWhileTask {
    /// Creates a loop with an explicit termination condition.
    pub fn new(
        reference_name: impl Into<String>,
        termination_condition: impl Into<String>,
        tasks: Vec<TaskNode>,
    ) -> Result<Self> {
        Ok(Self {
            task: Task::new(reference_name, TaskType::DoWhile)?,
            loop_condition: termination_condition.into(),
            loop_over: tasks,
        })
    }

    /// Creates a loop that runs its body `iterations` times.
    pub fn fixed(reference_name: impl Into<String>, iterations: u32, tasks: Vec<TaskNode>) -> Result<Self> {
        let reference_name = reference_name.into();
        let condition = loop_condition(&reference_name, iterations);
        Self::new(reference_name, condition, tasks)
    }

    /// Creates a loop over the collection addressed by `iterate_over`.
    ///
    /// The collection is passed to the engine as the `items` input.
    pub fn for_each(
        reference_name: impl Into<String>,
        iterate_over: impl Into<Value>,
        tasks: Vec<TaskNode>,
    ) -> Result<Self> {
        let reference_name = reference_name.into();
        let condition = loop_condition(&reference_name, 0);
        let mut task = Self::new(reference_name, condition, tasks)?;
        task.set_input("items", iterate_over);
        Ok(task)
    }

    /// Returns the condition evaluated after each iteration.
    pub fn loop_condition(&self) -> &str {
        &self.loop_condition
    }

    /// Returns the loop body.
    pub fn loop_over(&self) -> &[TaskNode] {
        &self.loop_over
    }

    /// Converts this loop into its primitive form with a normalized body.
    pub fn to_workflow_task(&self) -> WorkflowTask {
        let mut task = self.task.to_workflow_task();
        task.loop_condition = Some(self.loop_condition.clone());
        task.loop_over = Some(normalize(&self.loop_over));
        task
    }
}
