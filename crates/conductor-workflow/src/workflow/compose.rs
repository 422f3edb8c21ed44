//! The `>>` composition operator.

use std::ops::Shr;

use super::ConductorWorkflow;
use crate::task::TaskNode;

/// Appends a node, so `workflow >> fetch >> notify` reads in execution order.
///
/// Another [`ConductorWorkflow`] on the right-hand side is embedded as an
/// inline sub-workflow with a fresh reference name and its input template
/// copied into the node's inputs.
impl<T> Shr<T> for ConductorWorkflow
where
    T: Into<TaskNode>,
{
    type Output = Self;

    fn shr(self, task: T) -> Self::Output {
        self.add(task)
    }
}
