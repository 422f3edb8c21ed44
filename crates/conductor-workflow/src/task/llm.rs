//! AI task helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Task, TaskType};
use crate::Result;

/// Default task definition name of embedding generation tasks.
pub const GENERATE_EMBEDDINGS_TASK_NAME: &str = "llm_generate_embeddings";

/// An embedding model served by a configured provider.
///
/// Serializes to the `embeddingModelProvider`/`embeddingModel` pair the
/// indexing tasks expect, so it can be merged into task inputs with
/// [`Task::extend_input_parameters`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddingModel {
    #[serde(rename = "embeddingModelProvider")]
    pub provider: String,
    #[serde(rename = "embeddingModel")]
    pub model: String,
}

impl EmbeddingModel {
    /// Creates a model reference from the provider integration name and model name.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl Task {
    /// Creates an `LLM_GENERATE_EMBEDDINGS` task embedding `text`.
    pub fn llm_generate_embeddings(
        reference_name: impl Into<String>,
        llm_provider: impl Into<String>,
        model: impl Into<String>,
        text: impl Into<Value>,
    ) -> Result<Self> {
        Ok(Self::new(reference_name, TaskType::LlmGenerateEmbeddings)?
            .with_name(GENERATE_EMBEDDINGS_TASK_NAME)
            .with_input("llmProvider", Value::String(llm_provider.into()))
            .with_input("model", Value::String(model.into()))
            .with_input("text", text))
    }
}
