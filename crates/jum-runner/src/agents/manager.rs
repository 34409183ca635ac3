use std::sync::Arc;

use async_trait::async_trait;
use jum_core::{AgentError, AgentRole, PlannedTask};
use jum_llm::{CompletionOptions, ModelClient};
use jum_prompts::{assemble_prompt, system_prompt, PromptContext};
use tracing::{debug, info};

use super::ManagerAgent;
use crate::plan_parser::parse_plan;

/// Plans by asking the model for a labelled task list.
pub struct LlmManager {
    client: Arc<dyn ModelClient>,
}

impl LlmManager {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManagerAgent for LlmManager {
    async fn plan(&self, objective: &str) -> Result<Vec<PlannedTask>, AgentError> {
        let prompt = assemble_prompt(&PromptContext::for_objective(objective), AgentRole::Manager);
        let options = CompletionOptions::for_role(AgentRole::Manager)
            .with_system(system_prompt(AgentRole::Manager));

        let response = self.client.complete(&prompt, &options).await?;
        debug!("manager response from {}: {} chars", self.client.name(), response.len());

        let plan = parse_plan(&response)?;
        info!("manager planned {} item(s)", plan.len());
        Ok(plan)
    }
}
