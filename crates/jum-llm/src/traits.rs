use std::time::Duration;

use async_trait::async_trait;
use jum_core::{AgentError, AgentRole};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model server error: {0}")]
    Upstream(String),

    #[error("no response within {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

impl From<ModelError> for AgentError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Upstream(msg) => AgentError::Upstream(msg),
            ModelError::Timeout(d) => AgentError::Timeout(d),
        }
    }
}

/// Per-call sampling options.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Sent as a leading system message when present.
    pub system: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 2048,
            system: None,
        }
    }
}

impl CompletionOptions {
    pub fn for_role(role: AgentRole) -> Self {
        Self {
            temperature: role.temperature(),
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A chat-completion capable model.
///
/// One call is one outbound request. Implementations do not retry and do
/// not cache; retry policy belongs to the caller.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str, options: &CompletionOptions)
        -> Result<String, ModelError>;
}
