use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::Verdict;

/// Something that happened during a run, as persisted to the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        objective: String,
    },
    PlanReady {
        subtasks: Vec<String>,
        doc_requests: Vec<String>,
    },
    ArtifactProduced {
        subtask_id: u32,
        attempt: u32,
        files: Vec<String>,
    },
    Reviewed {
        subtask_id: u32,
        attempt: u32,
        verdict: Verdict,
        feedback: String,
    },
    SubtaskPassed {
        subtask_id: u32,
        attempts: u32,
    },
    SubtaskFailed {
        subtask_id: u32,
        attempts: u32,
        feedback: String,
    },
    Documented {
        commit_message: String,
    },
    CommitSkipped {
        reason: String,
    },
    Committed {
        commit: String,
        pushed: bool,
    },
    RunFailed {
        phase: String,
        subtask_id: Option<u32>,
        error: String,
    },
    RunCompleted {
        phase: String,
        changelog_entries: usize,
    },
}

impl RunEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::RunStarted { .. } => "run_started",
            RunEvent::PlanReady { .. } => "plan_ready",
            RunEvent::ArtifactProduced { .. } => "artifact_produced",
            RunEvent::Reviewed { .. } => "reviewed",
            RunEvent::SubtaskPassed { .. } => "subtask_passed",
            RunEvent::SubtaskFailed { .. } => "subtask_failed",
            RunEvent::Documented { .. } => "documented",
            RunEvent::CommitSkipped { .. } => "commit_skipped",
            RunEvent::Committed { .. } => "committed",
            RunEvent::RunFailed { .. } => "run_failed",
            RunEvent::RunCompleted { .. } => "run_completed",
        }
    }
}

/// One line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    #[serde(flatten)]
    pub event: RunEvent,
}

impl EventRecord {
    pub fn now(run_id: &str, event: RunEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            run_id: run_id.to_string(),
            event,
        }
    }
}
