use std::fmt;

use serde::{Deserialize, Serialize};

/// Which agent a planned item is meant for.
///
/// `Dev` and `Qa` items are developed and reviewed like any other
/// sub-task. `Doc` items never enter the Dev/QA loop; they are handed to
/// the Doc agent as documentation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Dev,
    Qa,
    Doc,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Dev => "dev",
            TaskKind::Qa => "qa",
            TaskKind::Doc => "doc",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item of the Manager's plan, before the run assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub description: String,
    pub kind: TaskKind,
}

impl PlannedTask {
    pub fn new(description: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            description: description.into(),
            kind,
        }
    }

    pub fn dev(description: impl Into<String>) -> Self {
        Self::new(description, TaskKind::Dev)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTaskStatus {
    Pending,
    InProgress,
    Passed,
    Failed,
}

impl SubTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubTaskStatus::Pending => "pending",
            SubTaskStatus::InProgress => "in_progress",
            SubTaskStatus::Passed => "passed",
            SubTaskStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, SubTaskStatus::Passed | SubTaskStatus::Failed)
    }
}

impl fmt::Display for SubTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of planned work owned by the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    /// 1-based position in the plan.
    pub id: u32,
    pub description: String,
    pub kind: TaskKind,
    pub status: SubTaskStatus,
    /// Number of Dev agent invocations made so far.
    pub attempts: u32,
}

impl SubTask {
    pub fn new(id: u32, description: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id,
            description: description.into(),
            kind,
            status: SubTaskStatus::Pending,
            attempts: 0,
        }
    }
}
