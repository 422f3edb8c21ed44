//! Task type identifiers.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Task types understood by the engine.
///
/// The wire form is the SCREAMING_SNAKE_CASE name, e.g. `FORK_JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Task executed by an external worker.
    #[default]
    Simple,
    Dynamic,
    ForkJoin,
    ForkJoinDynamic,
    Decision,
    Switch,
    Join,
    DoWhile,
    SubWorkflow,
    StartWorkflow,
    Event,
    Wait,
    Human,
    UserDefined,
    Http,
    LlmTextComplete,
    LlmGenerateEmbeddings,
    LlmGetEmbeddings,
    LlmIndexText,
    LlmSearchIndex,
    GetDocument,
    Inline,
    Terminate,
    SetVariable,
    JsonJqTransform,
    KafkaPublish,
}

impl TaskType {
    /// Returns the wire name of this task type.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
