//! Workflow executor implementation.
//!
//! This module implements the [`WorkflowExecutor`] trait for [`ConductorClient`].

use conductor_workflow::definition::WorkflowDef;
use conductor_workflow::executor::{
    ExecuteWorkflowRequest, StartWorkflowRequest, WorkflowExecutor, WorkflowRun,
};
use uuid::Uuid;

use crate::connect::{ConductorClient, TRACING_TARGET, decode};
use crate::error::Error;

/// Version executed when a synchronous request does not name one.
const DEFAULT_EXECUTE_VERSION: u32 = 1;

/// Path segments and query string of a synchronous execution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExecuteTarget {
    /// Workflow name and version, appended to `workflow/execute`.
    pub segments: [String; 2],
    pub request_id: String,
    pub query: Vec<(&'static str, String)>,
}

/// Resolves where and how a synchronous execution is sent.
///
/// A missing version executes version 1 and a missing request id is
/// replaced by a random one.
pub(crate) fn execute_target(request: &ExecuteWorkflowRequest) -> ExecuteTarget {
    let start = &request.request;
    let version = start.version.unwrap_or(DEFAULT_EXECUTE_VERSION);
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut query = vec![
        ("requestId", request_id.clone()),
        ("waitForSeconds", request.wait_for_seconds.to_string()),
    ];
    if let Some(reference_name) = &request.wait_until_task_ref {
        query.push(("waitUntilTaskRef", reference_name.clone()));
    }

    ExecuteTarget {
        segments: [start.name.clone(), version.to_string()],
        request_id,
        query,
    }
}

#[async_trait::async_trait]
impl WorkflowExecutor for ConductorClient {
    async fn register_workflow(
        &self,
        definition: &WorkflowDef,
        overwrite: bool,
    ) -> conductor_workflow::Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %definition.name,
            overwrite,
            "Sending workflow definition"
        );

        let request = self
            .http()
            .post(self.endpoint("metadata/workflow")?)
            .query(&[("overwrite", overwrite)])
            .json(definition);
        self.send(request).await?;

        Ok(())
    }

    async fn start_workflow(
        &self,
        request: &StartWorkflowRequest,
    ) -> conductor_workflow::Result<String> {
        let http_request = self.http().post(self.endpoint("workflow")?).json(request);
        let response = self.send(http_request).await?;
        let workflow_id = response.text().await.map_err(Error::from)?;

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %request.name,
            workflow_id = %workflow_id.trim(),
            "Workflow start accepted"
        );

        Ok(workflow_id.trim().trim_matches('"').to_owned())
    }

    async fn execute_workflow(
        &self,
        request: &ExecuteWorkflowRequest,
    ) -> conductor_workflow::Result<WorkflowRun> {
        let start = &request.request;
        let execution = execute_target(request);

        let segments = execution.segments.each_ref().map(String::as_str);
        let url = self.endpoint_with_segments("workflow/execute", &segments)?;

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %start.name,
            request_id = %execution.request_id,
            "Sending synchronous execution"
        );

        let http_request = self.http().post(url).query(&execution.query).json(start);
        let response = self.send(http_request).await?;
        let run = decode::<WorkflowRun>(response).await?;

        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use conductor_workflow::ErrorKind;
    use conductor_workflow::executor::ExecutorService;

    use super::*;
    use crate::ConductorConfig;
    use crate::test_server::TestServer;

    fn executor(server: &TestServer) -> ExecutorService {
        ConductorClient::new(ConductorConfig::new(&server.url))
            .unwrap()
            .into_service()
    }

    #[test]
    fn test_execute_target_defaults() {
        let request = ExecuteWorkflowRequest::new(StartWorkflowRequest::new("order_flow"));
        let execution = execute_target(&request);

        assert_eq!(execution.segments, ["order_flow".to_owned(), "1".to_owned()]);
        assert_eq!(
            Uuid::parse_str(&execution.request_id)
                .unwrap()
                .get_version_num(),
            4
        );
        assert_eq!(
            execution.query,
            vec![
                ("requestId", execution.request_id.clone()),
                ("waitForSeconds", "10".to_owned()),
            ]
        );
    }

    #[test]
    fn test_execute_target_with_options() {
        let mut start = StartWorkflowRequest::new("order_flow");
        start.version = Some(3);
        let request = ExecuteWorkflowRequest::new(start)
            .with_request_id("req-1")
            .with_wait_for_seconds(30)
            .with_wait_until_task_ref("charge");
        let execution = execute_target(&request);

        assert_eq!(execution.segments, ["order_flow".to_owned(), "3".to_owned()]);
        assert_eq!(execution.request_id, "req-1");
        assert_eq!(
            execution.query,
            vec![
                ("requestId", "req-1".to_owned()),
                ("waitForSeconds", "30".to_owned()),
                ("waitUntilTaskRef", "charge".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_request_shape() {
        let server = TestServer::start("unused", false).await;
        let request = ExecuteWorkflowRequest::new(StartWorkflowRequest::new("order flow"))
            .with_request_id("req-1")
            .with_wait_until_task_ref("charge");

        let run = executor(&server).execute_workflow(&request).await.unwrap();

        assert_eq!(run.workflow_id, "wf-9");
        assert!(run.status.is_successful());
        let received = server.received();
        assert_eq!(
            received[0].target,
            "/api/workflow/execute/order%20flow/1?requestId=req-1&waitForSeconds=10&waitUntilTaskRef=charge"
        );
        assert!(received[0].body.contains(r#""name":"order flow""#));
    }

    #[tokio::test]
    async fn test_start_and_register_requests() {
        let server = TestServer::start("unused", false).await;
        let executor = executor(&server);

        let workflow_id = executor
            .start_workflow(&StartWorkflowRequest::new("order_flow"))
            .await
            .unwrap();
        assert_eq!(workflow_id, "wf-1");

        let definition: WorkflowDef =
            serde_json::from_value(serde_json::json!({"name": "order_flow"})).unwrap();
        executor.register_workflow(&definition, true).await.unwrap();

        let received = server.received();
        assert_eq!(received[0].target, "/api/workflow");
        assert_eq!(received[1].target, "/api/metadata/workflow?overwrite=true");
        assert!(received[1].body.contains(r#""schemaVersion":2"#));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let config = ConductorConfig::new("http://127.0.0.1:9/api").with_timeout(2);
        let executor = ConductorClient::new(config).unwrap().into_service();

        let definition: WorkflowDef =
            serde_json::from_value(serde_json::json!({"name": "unreachable"})).unwrap();
        let error = executor
            .register_workflow(&definition, false)
            .await
            .unwrap_err();

        assert!(matches!(
            error.kind(),
            ErrorKind::NetworkError | ErrorKind::Timeout
        ));
        assert!(error.is_retryable());
    }
}
