use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::{CodeArtifact, QaReport};
use crate::error::AgentError;
use crate::subtask::{PlannedTask, SubTask, SubTaskStatus, TaskKind};

/// Orchestrator state machine.
///
/// ```text
/// Planning -> Developing(s, 1) <-> Reviewing(s, n) -> Developing(s+k, 1) ... -> Documenting
///          -> Committing -> Done
/// any non-terminal phase -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RunPhase {
    Planning,
    Developing { subtask_id: u32, attempt: u32 },
    Reviewing { subtask_id: u32, attempt: u32 },
    Documenting,
    Committing,
    Done,
    Failed,
}

impl RunPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::Planning => "planning",
            RunPhase::Developing { .. } => "developing",
            RunPhase::Reviewing { .. } => "reviewing",
            RunPhase::Documenting => "documenting",
            RunPhase::Committing => "committing",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        }
    }

    pub fn subtask_id(&self) -> Option<u32> {
        match self {
            RunPhase::Developing { subtask_id, .. } | RunPhase::Reviewing { subtask_id, .. } => {
                Some(*subtask_id)
            }
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: &RunPhase) -> bool {
        use RunPhase::*;

        if matches!(next, Failed) {
            return !self.is_terminal();
        }

        match (self, next) {
            (Planning, Developing { attempt, .. }) => *attempt == 1,
            (
                Developing {
                    subtask_id: s,
                    attempt: a,
                },
                Reviewing {
                    subtask_id: ns,
                    attempt: na,
                },
            ) => s == ns && a == na,
            (
                Reviewing {
                    subtask_id: s,
                    attempt: a,
                },
                Developing {
                    subtask_id: ns,
                    attempt: na,
                },
            ) => (ns == s && *na == a + 1) || (ns > s && *na == 1),
            (Reviewing { .. }, Documenting) => true,
            (Documenting, Committing) => true,
            (Committing, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Developing {
                subtask_id,
                attempt,
            }
            | RunPhase::Reviewing {
                subtask_id,
                attempt,
            } => write!(f, "{}(sub-task {subtask_id}, attempt {attempt})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// An accepted change. Only created from a passing QA report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub subtask_id: u32,
    pub description: String,
    pub artifact: CodeArtifact,
    pub report: QaReport,
    pub attempts: u32,
}

/// Per-run state owned by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub objective: String,
    pub subtasks: Vec<SubTask>,
    /// `DOC` items from the plan, forwarded to the Doc agent.
    pub doc_requests: Vec<String>,
    pub changelog: Vec<ChangelogEntry>,
    pub phase: RunPhase,
    pub started_at: DateTime<Utc>,
}

impl RunState {
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            objective: objective.into(),
            subtasks: Vec::new(),
            doc_requests: Vec::new(),
            changelog: Vec::new(),
            phase: RunPhase::Planning,
            started_at: Utc::now(),
        }
    }

    /// Install the Manager's plan. `Dev` and `Qa` items become sub-tasks
    /// numbered from 1 in plan order; `Doc` items become doc requests.
    pub fn apply_plan(&mut self, plan: Vec<PlannedTask>) -> Result<(), AgentError> {
        let mut subtasks = Vec::new();
        let mut doc_requests = Vec::new();
        for item in plan {
            match item.kind {
                TaskKind::Doc => doc_requests.push(item.description),
                kind => {
                    let id = subtasks.len() as u32 + 1;
                    subtasks.push(SubTask::new(id, item.description, kind));
                }
            }
        }
        if subtasks.is_empty() {
            return Err(AgentError::Planning(
                "plan contains no development sub-tasks".into(),
            ));
        }
        self.subtasks = subtasks;
        self.doc_requests = doc_requests;
        Ok(())
    }

    /// Move to `next`, rejecting transitions the state machine does not allow.
    pub fn transition(&mut self, next: RunPhase) -> Result<(), AgentError> {
        if !self.phase.can_transition_to(&next) {
            return Err(AgentError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Force the terminal failed phase. No-op when already terminal.
    pub fn fail(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = RunPhase::Failed;
        }
    }

    pub fn subtask(&self, id: u32) -> Option<&SubTask> {
        self.subtasks.iter().find(|s| s.id == id)
    }

    fn subtask_mut(&mut self, id: u32) -> Result<&mut SubTask, AgentError> {
        self.subtasks
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AgentError::Invariant(format!("unknown sub-task {id}")))
    }

    /// Count a Dev attempt and mark the sub-task in progress.
    pub fn begin_attempt(&mut self, id: u32) -> Result<u32, AgentError> {
        let subtask = self.subtask_mut(id)?;
        if subtask.status.is_finished() {
            return Err(AgentError::Invariant(format!(
                "sub-task {id} is already {}",
                subtask.status
            )));
        }
        subtask.status = SubTaskStatus::InProgress;
        subtask.attempts += 1;
        Ok(subtask.attempts)
    }

    /// Accept an artifact. The report must carry a pass verdict; this is the
    /// only way a sub-task becomes `Passed` or a changelog entry appears.
    pub fn record_pass(
        &mut self,
        id: u32,
        artifact: CodeArtifact,
        report: QaReport,
    ) -> Result<(), AgentError> {
        if !report.is_pass() {
            return Err(AgentError::Invariant(format!(
                "sub-task {id} cannot be accepted with a failing QA report"
            )));
        }
        let subtask = self.subtask_mut(id)?;
        subtask.status = SubTaskStatus::Passed;
        let entry = ChangelogEntry {
            subtask_id: id,
            description: subtask.description.clone(),
            attempts: subtask.attempts,
            artifact,
            report,
        };
        self.changelog.push(entry);
        Ok(())
    }

    pub fn mark_failed(&mut self, id: u32) -> Result<(), AgentError> {
        let subtask = self.subtask_mut(id)?;
        subtask.status = SubTaskStatus::Failed;
        Ok(())
    }

    pub fn passed_count(&self) -> usize {
        self.subtasks
            .iter()
            .filter(|s| s.status == SubTaskStatus::Passed)
            .count()
    }
}
