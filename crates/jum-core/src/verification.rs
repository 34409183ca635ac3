use serde::{Deserialize, Serialize};

/// A shell command run against a materialized artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStep {
    pub name: String,
    pub command: String,
    /// Relative to the sandbox root.
    pub working_dir: Option<String>,
    pub timeout_s: u64,
}

impl VerificationStep {
    pub fn new(name: impl Into<String>, command: impl Into<String>, timeout_s: u64) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            working_dir: None,
            timeout_s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTemplate {
    pub name: String,
    pub description: String,
    pub steps: Vec<StepTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTemplate {
    pub name: String,
    pub command: String,
    pub working_dir: Option<String>,
    pub timeout_s: u64,
}

impl ProfileTemplate {
    pub fn to_steps(&self) -> Vec<VerificationStep> {
        self.steps
            .iter()
            .map(|s| VerificationStep {
                name: s.name.clone(),
                command: s.command.clone(),
                working_dir: s.working_dir.clone(),
                timeout_s: s.timeout_s,
            })
            .collect()
    }
}
