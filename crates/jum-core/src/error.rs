use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::run::RunPhase;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("model call timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("planning failed: {0}")]
    Planning(String),

    #[error("code generation failed: {0}")]
    Generation(String),

    #[error("sub-task {subtask_id} did not pass QA after {attempts} attempt(s); last feedback: {feedback}")]
    RetryBudgetExceeded {
        subtask_id: u32,
        attempts: u32,
        feedback: String,
    },

    #[error("commit failed: {0}")]
    Commit(String),

    #[error("invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a run ended in `Failed`, and where.
#[derive(Debug)]
pub struct RunFailure {
    pub phase: RunPhase,
    pub subtask_id: Option<u32>,
    pub error: AgentError,
}

impl RunFailure {
    pub fn new(phase: RunPhase, error: AgentError) -> Self {
        Self {
            subtask_id: phase.subtask_id(),
            phase,
            error,
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subtask_id {
            Some(id) => write!(
                f,
                "run failed while {} (sub-task {id}): {}",
                self.phase.name(),
                self.error
            ),
            None => write!(f, "run failed while {}: {}", self.phase.name(), self.error),
        }
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
