//! Sub-workflow tasks, by reference or embedded by value.

use std::collections::BTreeMap;

use derive_more::{Deref, DerefMut};

use super::{Task, TaskType};
use crate::Result;
use crate::definition::{SubWorkflowParams, WorkflowDef, WorkflowTask};
use crate::workflow::ConductorWorkflow;

/// Runs a workflow already registered with the engine.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct SubWorkflowTask {
    #[deref]
    #[deref_mut]
    task: Task,
    workflow_name: String,
    version: Option<u32>,
    task_to_domain: Option<BTreeMap<String, String>>,
}

impl SubWorkflowTask {
    /// Creates a sub-workflow task. `None` runs the latest registered version.
    pub fn new(
        reference_name: impl Into<String>,
        workflow_name: impl Into<String>,
        version: Option<u32>,
    ) -> Result<Self> {
        Ok(Self {
            task: Task::new(reference_name, TaskType::SubWorkflow)?,
            workflow_name: workflow_name.into(),
            version,
            task_to_domain: None,
        })
    }

    /// Routes the named tasks of the sub-workflow to worker domains.
    #[must_use]
    pub fn with_task_to_domain(mut self, task_to_domain: BTreeMap<String, String>) -> Self {
        self.task_to_domain = Some(task_to_domain);
        self
    }

    /// Returns the name of the referenced workflow.
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    /// Returns the referenced version. `None` runs the latest one.
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Converts this node into its primitive wire form.
    pub fn to_workflow_task(&self) -> WorkflowTask {
        let mut task = self.task.to_workflow_task();
        task.sub_workflow_param = Some(SubWorkflowParams {
            name: self.workflow_name.clone(),
            version: self.version,
            task_to_domain: self.task_to_domain.clone(),
            workflow_definition: None,
        });
        task
    }
}

/// Runs a workflow embedded by value.
///
/// The embedded definition is exported when the task is created. Later
/// changes to the source workflow do not reach this task.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct InlineSubWorkflowTask {
    #[deref]
    #[deref_mut]
    task: Task,
    definition: WorkflowDef,
}

impl InlineSubWorkflowTask {
    /// Embeds a snapshot of `workflow`. Later changes to `workflow` are not reflected.
    pub fn new(reference_name: impl Into<String>, workflow: &ConductorWorkflow) -> Result<Self> {
        Ok(Self::from_task(
            Task::new(reference_name, TaskType::SubWorkflow)?,
            workflow,
        ))
    }

    pub(crate) fn from_task(task: Task, workflow: &ConductorWorkflow) -> Self {
        Self {
            task,
            definition: workflow.to_workflow_def(),
        }
    }

    /// Returns the embedded definition snapshot.
    pub fn definition(&self) -> &WorkflowDef {
        &self.definition
    }

    /// Converts this node into its primitive wire form.
    pub fn to_workflow_task(&self) -> WorkflowTask {
        let mut task = self.task.to_workflow_task();
        task.sub_workflow_param = Some(SubWorkflowParams {
            name: self.definition.name.clone(),
            version: self.definition.version,
            task_to_domain: None,
            workflow_definition: Some(Box::new(self.definition.clone())),
        });
        task
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sub_workflow_by_reference() {
        let task = SubWorkflowTask::new("child", "billing", Some(3))
            .unwrap()
            .with_task_to_domain(BTreeMap::from([("charge".into(), "payments".into())]));

        let value = serde_json::to_value(task.to_workflow_task()).unwrap();
        assert_eq!(value["type"], json!("SUB_WORKFLOW"));
        assert_eq!(
            value["subWorkflowParam"],
            json!({
                "name": "billing",
                "version": 3,
                "taskToDomain": {"charge": "payments"},
            })
        );
    }

    #[test]
    fn test_sub_workflow_latest_version() {
        let task = SubWorkflowTask::new("child", "billing", None).unwrap();
        let params = task.to_workflow_task().sub_workflow_param.unwrap();

        assert_eq!(params.version, None);
        assert!(params.workflow_definition.is_none());
    }

    #[test]
    fn test_inline_snapshot_ignores_later_changes() {
        let workflow = ConductorWorkflow::new("child")
            .with_version(2)
            .add(Task::simple("a", "a").unwrap());
        let inline = InlineSubWorkflowTask::new("embedded", &workflow).unwrap();

        let workflow = workflow.add(Task::simple("b", "b").unwrap());
        assert_eq!(workflow.tasks().len(), 2);

        let params = inline.to_workflow_task().sub_workflow_param.unwrap();
        assert_eq!(params.name, "child");
        assert_eq!(params.version, Some(2));

        let definition = params.workflow_definition.unwrap();
        assert_eq!(definition.tasks.len(), 1);
        assert_eq!(definition.tasks[0].task_reference_name, "a");
    }
}
