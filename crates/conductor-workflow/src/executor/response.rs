//! Results returned by a workflow executor.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

/// Status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    #[default]
    Running,
    Completed,
    Failed,
    TimedOut,
    Terminated,
    Paused,
}

impl WorkflowStatus {
    /// Returns whether the run has ended and will not change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::TimedOut | Self::Terminated
        )
    }

    /// Returns whether the run is still executing.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns whether the run completed successfully.
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// State of a single task within a run, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub reference_task_name: String,
    #[serde(default)]
    pub task_type: String,
    /// Engine task status, e.g. `SCHEDULED` or `COMPLETED`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub output_data: Map<String, Value>,
}

/// Snapshot of a workflow run returned by a synchronous execution.
///
/// The engine returns once the run ends or the wait bound elapses, so the
/// status may still be [`WorkflowStatus::Running`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub workflow_id: String,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub input: Map<String, Value>,
    #[serde(default)]
    pub output: Map<String, Value>,
    #[serde(default)]
    pub tasks: Vec<TaskRun>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Creation time, sent by the engine as epoch milliseconds.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "jiff::fmt::serde::timestamp::millisecond::optional"
    )]
    pub create_time: Option<Timestamp>,
    /// Last update time, sent by the engine as epoch milliseconds.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "jiff::fmt::serde::timestamp::millisecond::optional"
    )]
    pub update_time: Option<Timestamp>,
}

impl WorkflowRun {
    /// Returns the task run with the given reference name.
    pub fn task(&self, reference_name: &str) -> Option<&TaskRun> {
        self.tasks
            .iter()
            .find(|task| task.reference_task_name == reference_name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(WorkflowStatus::Completed.is_terminal());
        assert!(WorkflowStatus::TimedOut.is_terminal());
        assert!(!WorkflowStatus::Running.is_terminal());
        assert!(!WorkflowStatus::Paused.is_terminal());
        assert!(WorkflowStatus::Running.is_running());
        assert!(!WorkflowStatus::Failed.is_successful());
    }

    #[test]
    fn test_run_deserialization() {
        let run: WorkflowRun = serde_json::from_value(json!({
            "workflowId": "wf-1",
            "status": "TIMED_OUT",
            "output": {"total": 3},
            "requestId": "req-1",
            "createTime": 1700000000000i64,
            "tasks": [
                {"taskId": "t-1", "referenceTaskName": "fetch", "taskType": "SIMPLE", "status": "COMPLETED"}
            ],
            "priority": 0,
        }))
        .unwrap();

        assert_eq!(run.status, WorkflowStatus::TimedOut);
        assert_eq!(run.output.get("total"), Some(&json!(3)));
        assert_eq!(run.request_id.as_deref(), Some("req-1"));
        assert_eq!(run.task("fetch").map(|t| t.status.as_str()), Some("COMPLETED"));
        assert!(run.task("missing").is_none());
        assert_eq!(
            run.create_time,
            Some(Timestamp::from_millisecond(1_700_000_000_000).unwrap())
        );
        assert!(run.update_time.is_none());
    }

    #[test]
    fn test_run_timestamps_serialize_as_milliseconds() {
        let run = WorkflowRun {
            workflow_id: "wf-2".into(),
            update_time: Some(Timestamp::from_millisecond(1_700_000_123_456).unwrap()),
            ..WorkflowRun::default()
        };

        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["updateTime"], json!(1_700_000_123_456i64));
        assert!(value.get("createTime").is_none());
    }
}
