use std::sync::Arc;

use async_trait::async_trait;
use jum_core::{AgentError, AgentRole, CodeArtifact, SubTask};
use jum_llm::{CompletionOptions, ModelClient};
use jum_prompts::{assemble_prompt, system_prompt, PromptContext};
use tracing::{debug, info};

use super::{DevAgent, Retry};
use crate::artifact_parser::parse_artifact;

/// Generates code by asking the model for `### FILE:` blocks.
pub struct LlmDev {
    client: Arc<dyn ModelClient>,
}

impl LlmDev {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DevAgent for LlmDev {
    async fn develop(
        &self,
        objective: &str,
        subtask: &SubTask,
        retry: Option<&Retry>,
    ) -> Result<CodeArtifact, AgentError> {
        let mut ctx = PromptContext::for_objective(objective);
        ctx.subtask = Some(subtask.clone());
        if let Some(retry) = retry {
            ctx.artifact = Some(retry.previous.clone());
            ctx.feedback = Some(retry.feedback.clone());
        }

        let prompt = assemble_prompt(&ctx, AgentRole::Dev);
        let options =
            CompletionOptions::for_role(AgentRole::Dev).with_system(system_prompt(AgentRole::Dev));
        let response = self.client.complete(&prompt, &options).await?;
        debug!(
            "dev response from {} for sub-task {}: {} chars",
            self.client.name(),
            subtask.id,
            response.len()
        );

        let artifact = parse_artifact(&response)?;
        info!(
            "sub-task {}: dev produced {}",
            subtask.id,
            artifact.paths().join(", ")
        );
        Ok(artifact)
    }
}
