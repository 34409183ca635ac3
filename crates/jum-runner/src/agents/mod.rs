pub mod dev;
pub mod doc;
pub mod manager;
pub mod mock;
pub mod qa;

use std::sync::Arc;

use async_trait::async_trait;
use jum_core::{AgentError, ChangelogEntry, CodeArtifact, PlannedTask, QaReport, SubTask};
use serde::{Deserialize, Serialize};

pub use dev::LlmDev;
pub use doc::LlmDoc;
pub use manager::LlmManager;
pub use qa::{ReviewQa, SandboxQa};

/// The rejected previous attempt, handed back to the Dev agent on retry.
#[derive(Debug, Clone)]
pub struct Retry {
    pub previous: CodeArtifact,
    pub feedback: String,
}

/// What the Doc agent produces for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    pub readme_update: String,
    pub changelog_md: String,
    pub commit_message: String,
}

/// Breaks an objective into an ordered plan.
#[async_trait]
pub trait ManagerAgent: Send + Sync {
    async fn plan(&self, objective: &str) -> Result<Vec<PlannedTask>, AgentError>;
}

/// Produces a code artifact for one sub-task.
#[async_trait]
pub trait DevAgent: Send + Sync {
    async fn develop(
        &self,
        objective: &str,
        subtask: &SubTask,
        retry: Option<&Retry>,
    ) -> Result<CodeArtifact, AgentError>;
}

/// Judges an artifact against its sub-task. A failing verdict is a report,
/// never an `Err`.
#[async_trait]
pub trait QaAgent: Send + Sync {
    async fn review(
        &self,
        objective: &str,
        subtask: &SubTask,
        artifact: &CodeArtifact,
    ) -> Result<QaReport, AgentError>;
}

/// Documents the accepted changes. Must be a pure function of its inputs
/// apart from the model call itself.
#[async_trait]
pub trait DocAgent: Send + Sync {
    async fn document(
        &self,
        objective: &str,
        changelog: &[ChangelogEntry],
        doc_requests: &[String],
    ) -> Result<Documentation, AgentError>;
}

/// The four agents a run needs.
#[derive(Clone)]
pub struct Agents {
    pub manager: Arc<dyn ManagerAgent>,
    pub dev: Arc<dyn DevAgent>,
    pub qa: Arc<dyn QaAgent>,
    pub doc: Arc<dyn DocAgent>,
}
