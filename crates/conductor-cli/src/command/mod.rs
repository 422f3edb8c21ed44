//! Subcommands operating on a workflow definition file.

mod input;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Subcommand};
use conductor_workflow::executor::{
    DEFAULT_WAIT_FOR_SECONDS, ExecuteWorkflowRequest, ExecutorService, IdempotencyStrategy,
    StartWorkflowRequest,
};

pub use self::input::{load_definition, parse_input};
use crate::TRACING_TARGET_COMMAND;

/// Operations on a workflow definition document.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register the definition with the server
    Register(RegisterArgs),
    /// Start a run of the definition without registering it
    Start(StartArgs),
    /// Run the definition and wait for the result
    Execute(ExecuteArgs),
    /// Print the parsed definition with defaults filled in
    Render(RenderArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    /// Path to the workflow definition JSON file
    pub file: PathBuf,

    /// Replace an existing definition with the same name and version
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    /// Path to the workflow definition JSON file
    pub file: PathBuf,

    /// Workflow input as a JSON object
    #[arg(long)]
    pub input: Option<String>,

    /// Correlation id attached to the run
    #[arg(long)]
    pub correlation_id: Option<String>,

    /// Idempotency key for the start request
    #[arg(long)]
    pub idempotency_key: Option<String>,

    /// What to do when the idempotency key was already used
    #[arg(long, requires = "idempotency_key", default_value = "FAIL")]
    pub idempotency_strategy: IdempotencyStrategy,

    /// Run priority, 0 to 99
    #[arg(long)]
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct ExecuteArgs {
    /// Path to the workflow definition JSON file
    pub file: PathBuf,

    /// Workflow input as a JSON object
    #[arg(long)]
    pub input: Option<String>,

    /// Upper bound on how long the server waits before answering
    #[arg(long, default_value_t = DEFAULT_WAIT_FOR_SECONDS)]
    pub wait_for_seconds: u32,

    /// Return as soon as this task has completed
    #[arg(long)]
    pub wait_until_task_ref: Option<String>,

    /// Request id used to deduplicate the execution
    #[arg(long)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Path to the workflow definition JSON file
    pub file: PathBuf,
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::Start(_) => "start",
            Self::Execute(_) => "execute",
            Self::Render(_) => "render",
        }
    }

    /// Runs the subcommand and returns the text to print.
    pub async fn run(self, executor: &ExecutorService) -> anyhow::Result<String> {
        let started_at = Instant::now();
        let name = self.name();

        let output = match self {
            Self::Register(args) => register(executor, args).await?,
            Self::Start(args) => start(executor, args).await?,
            Self::Execute(args) => execute(executor, args).await?,
            Self::Render(args) => render(args)?,
        };

        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            command = name,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Command completed"
        );

        Ok(output)
    }
}

async fn register(executor: &ExecutorService, args: RegisterArgs) -> anyhow::Result<String> {
    let definition = load_definition(&args.file)?;

    executor
        .register_workflow(&definition, args.overwrite)
        .await
        .with_context(|| format!("failed to register workflow {}", definition.name))?;

    Ok(match definition.version {
        Some(version) => format!("Registered {} version {version}", definition.name),
        None => format!("Registered {}", definition.name),
    })
}

async fn start(executor: &ExecutorService, args: StartArgs) -> anyhow::Result<String> {
    let definition = load_definition(&args.file)?;
    let name = definition.name.clone();

    let mut builder = StartWorkflowRequest::builder()
        .with_name(name.clone())
        .with_input(parse_input(args.input.as_deref())?)
        .with_workflow_def(definition.clone());
    if let Some(version) = definition.version {
        builder = builder.with_version(version);
    }
    if let Some(correlation_id) = args.correlation_id {
        builder = builder.with_correlation_id(correlation_id);
    }
    if let Some(key) = args.idempotency_key {
        builder = builder
            .with_idempotency_key(key)
            .with_idempotency_strategy(args.idempotency_strategy);
    }
    if let Some(priority) = args.priority {
        builder = builder.with_priority(priority);
    }
    let request = builder.build().context("failed to build start request")?;

    let workflow_id = executor
        .start_workflow(&request)
        .await
        .with_context(|| format!("failed to start workflow {name}"))?;

    Ok(workflow_id)
}

async fn execute(executor: &ExecutorService, args: ExecuteArgs) -> anyhow::Result<String> {
    let definition = load_definition(&args.file)?;
    let name = definition.name.clone();

    let mut start = StartWorkflowRequest::new(name.clone());
    start.version = definition.version;
    start.input = parse_input(args.input.as_deref())?;
    start.workflow_def = Some(definition);

    let mut request = ExecuteWorkflowRequest::new(start).with_wait_for_seconds(args.wait_for_seconds);
    request.wait_until_task_ref = args.wait_until_task_ref;
    request.request_id = args.request_id;

    let run = executor
        .execute_workflow(&request)
        .await
        .with_context(|| format!("failed to execute workflow {name}"))?;

    if !run.status.is_terminal() {
        tracing::warn!(
            target: TRACING_TARGET_COMMAND,
            workflow_id = %run.workflow_id,
            status = %run.status,
            "Run still active when the server answered"
        );
    }

    serde_json::to_string_pretty(&run).context("failed to serialize workflow run")
}

fn render(args: RenderArgs) -> anyhow::Result<String> {
    let definition = load_definition(&args.file)?;
    serde_json::to_string_pretty(&definition).context("failed to serialize definition")
}
