//! Expansion of task nodes into the primitive list sent to the engine.

use crate::TRACING_TARGET;
use crate::definition::WorkflowTask;
use crate::task::{TaskNode, TaskType};

/// Expands `nodes` in order and terminates every unjoined fork.
///
/// Nested bodies (loop bodies, fork branches) are normalized by their own
/// expansion, so this pass only looks at the top level of `nodes`.
pub fn normalize(nodes: &[TaskNode]) -> Vec<WorkflowTask> {
    let expanded = nodes.iter().flat_map(TaskNode::expand).collect();
    insert_implicit_joins(expanded)
}

/// Inserts a `JOIN` after each `FORK_JOIN` that is not already followed by one.
///
/// The inserted join is named `join_<fork ref>` and waits on the last task of
/// every branch in branch order. A fork followed by any explicit join is left
/// untouched, even when that join waits on different tasks.
pub fn insert_implicit_joins(tasks: Vec<WorkflowTask>) -> Vec<WorkflowTask> {
    let mut normalized = Vec::with_capacity(tasks.len());
    let mut tasks = tasks.into_iter().peekable();

    while let Some(task) = tasks.next() {
        let join = (task.is_fork() && !tasks.peek().is_some_and(WorkflowTask::is_join))
            .then(|| implicit_join(&task));

        normalized.push(task);
        normalized.extend(join);
    }

    normalized
}

fn implicit_join(fork: &WorkflowTask) -> WorkflowTask {
    let join_on: Vec<String> = fork
        .fork_tasks
        .iter()
        .flatten()
        .filter_map(|branch| branch.last())
        .map(|task| task.task_reference_name.clone())
        .collect();

    let reference_name = format!("join_{}", fork.task_reference_name);

    tracing::trace!(
        target: TRACING_TARGET,
        fork = %fork.task_reference_name,
        join = %reference_name,
        join_on = ?join_on,
        "Inserting implicit join"
    );

    let mut join = WorkflowTask::new(TaskType::Join.as_str(), reference_name, TaskType::Join);
    join.join_on = Some(join_on);
    join
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{DynamicForkTask, ForkTask, JoinTask, Task};

    fn simple(reference_name: &str) -> TaskNode {
        Task::simple(reference_name, reference_name).unwrap().into()
    }

    fn references(tasks: &[WorkflowTask]) -> Vec<&str> {
        tasks
            .iter()
            .map(|task| task.task_reference_name.as_str())
            .collect()
    }

    #[test]
    fn test_unjoined_fork_gets_join() {
        let fork = ForkTask::new("f", vec![vec![simple("a")], vec![simple("b"), simple("c")]]).unwrap();
        let tasks = normalize(&[fork.into(), simple("d")]);

        assert_eq!(references(&tasks), vec!["f", "join_f", "d"]);
        assert_eq!(tasks[1].task_type, "JOIN");
        assert_eq!(tasks[1].name, "JOIN");
        assert_eq!(tasks[1].join_on, Some(vec!["a".to_owned(), "c".to_owned()]));
    }

    #[test]
    fn test_trailing_fork_gets_join() {
        let fork = ForkTask::new("f", vec![vec![simple("a")]]).unwrap();
        let tasks = normalize(&[simple("start"), fork.into()]);

        assert_eq!(references(&tasks), vec!["start", "f", "join_f"]);
    }

    #[test]
    fn test_explicit_join_is_kept() {
        let fork = ForkTask::new("f", vec![vec![simple("a")], vec![simple("b")]]).unwrap();
        let join = JoinTask::new("my_join", vec!["a".into(), "b".into()]).unwrap();
        let tasks = normalize(&[fork.into(), join.into()]);

        assert_eq!(references(&tasks), vec!["f", "my_join"]);
    }

    #[test]
    fn test_mismatched_explicit_join_is_kept() {
        let fork = ForkTask::new("f", vec![vec![simple("a")], vec![simple("b")]]).unwrap();
        let join = JoinTask::new("partial", vec!["a".into()]).unwrap();
        let tasks = normalize(&[fork.into(), join.into()]);

        assert_eq!(references(&tasks), vec!["f", "partial"]);
        assert_eq!(tasks[1].join_on, Some(vec!["a".to_owned()]));
    }

    #[test]
    fn test_zero_branch_fork() {
        let fork = ForkTask::new("f", vec![]).unwrap();
        let tasks = normalize(&[fork.into()]);

        assert_eq!(references(&tasks), vec!["f", "join_f"]);
        assert_eq!(tasks[0].fork_tasks, Some(vec![]));
        assert_eq!(tasks[1].join_on, Some(vec![]));
    }

    #[test]
    fn test_consecutive_forks() {
        let first = ForkTask::new("f1", vec![vec![simple("a")]]).unwrap();
        let second = ForkTask::new("f2", vec![vec![simple("b")]]).unwrap();
        let tasks = normalize(&[first.into(), second.into()]);

        assert_eq!(references(&tasks), vec!["f1", "join_f1", "f2", "join_f2"]);
    }

    #[test]
    fn test_nested_fork_in_branch() {
        let inner = ForkTask::new("inner", vec![vec![simple("x")], vec![simple("y")]]).unwrap();
        let outer = ForkTask::new("outer", vec![vec![inner.into()], vec![simple("z")]]).unwrap();
        let tasks = normalize(&[outer.into()]);

        assert_eq!(references(&tasks), vec!["outer", "join_outer"]);

        let branches = tasks[0].fork_tasks.as_ref().unwrap();
        assert_eq!(references(&branches[0]), vec!["inner", "join_inner"]);
        assert_eq!(
            tasks[1].join_on,
            Some(vec!["join_inner".to_owned(), "z".to_owned()])
        );
    }

    #[test]
    fn test_dynamic_fork_has_single_join() {
        let fork = DynamicForkTask::new("dyn", "${a.output.t}", "${a.output.i}").unwrap();
        let tasks = normalize(&[fork.into(), simple("after")]);

        assert_eq!(references(&tasks), vec!["dyn", "dyn_join", "after"]);
    }

    #[test]
    fn test_task_count_matches_expansion() {
        let nodes = vec![simple("a"), simple("b"), simple("c")];
        assert_eq!(normalize(&nodes).len(), 3);
        assert!(normalize(&[]).is_empty());
    }
}
