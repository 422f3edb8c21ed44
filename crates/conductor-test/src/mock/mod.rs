//! Mock implementations of the workflow executor for testing.
//!
//! The mock never contacts an engine. It records what it receives and
//! answers with generated ids, which makes it suitable for unit and
//! integration tests of code that registers or runs workflows.

mod executor;

use conductor_workflow::executor::ExecutorService;
pub use executor::{MockExecutorConfig, MockWorkflowExecutor};

/// Creates a mock executor service with the default configuration.
pub fn create_mock_service() -> ExecutorService {
    ExecutorService::new(MockWorkflowExecutor::default())
}
