use std::fmt;

use serde::{Deserialize, Serialize};

/// The cooperating agents of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Manager,
    Dev,
    Qa,
    Doc,
}

impl AgentRole {
    pub const ALL: &[AgentRole] = &[
        AgentRole::Manager,
        AgentRole::Dev,
        AgentRole::Qa,
        AgentRole::Doc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Manager => "manager",
            AgentRole::Dev => "dev",
            AgentRole::Qa => "qa",
            AgentRole::Doc => "doc",
        }
    }

    /// Sampling temperature used when this role talks to the model.
    pub fn temperature(&self) -> f32 {
        match self {
            AgentRole::Manager => 0.3,
            AgentRole::Dev => 0.1,
            AgentRole::Qa => 0.0,
            AgentRole::Doc => 0.2,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
