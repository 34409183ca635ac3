use jum_core::{
    AgentError, EventRecord, RunEvent, RunFailure, RunPhase, RunState, Verdict,
};
use tracing::{error, info, warn};

use crate::agents::{Agents, Documentation, Retry};
use crate::commit::{CommitConfirmation, CommitOutcome, RepoCommitter};
use crate::config::OrchestratorSettings;
use crate::event_log::EventLog;
use crate::report::RunReport;

/// Drives one objective through Planning, the per-sub-task Dev/QA loop,
/// Documenting and, when confirmed, Committing.
///
/// Every sub-task gets at most `max_attempts` Dev invocations. A sub-task
/// that never passes review fails the run; entries accepted before that
/// stay in the returned changelog.
pub struct Orchestrator {
    agents: Agents,
    settings: OrchestratorSettings,
    event_log: Option<EventLog>,
    commit: Option<CommitStep>,
}

struct CommitStep {
    confirmation: Box<dyn CommitConfirmation>,
    committer: Box<dyn RepoCommitter>,
}

#[derive(Default)]
struct Outputs {
    documentation: Option<Documentation>,
    commit: Option<CommitOutcome>,
}

impl Orchestrator {
    pub fn new(agents: Agents, settings: OrchestratorSettings) -> Self {
        Self {
            agents,
            settings,
            event_log: None,
            commit: None,
        }
    }

    pub fn with_event_log(mut self, log: EventLog) -> Self {
        self.event_log = Some(log);
        self
    }

    /// Enable the commit step. `committer` only runs when `confirmation`
    /// agrees.
    pub fn with_commit(
        mut self,
        confirmation: Box<dyn CommitConfirmation>,
        committer: Box<dyn RepoCommitter>,
    ) -> Self {
        self.commit = Some(CommitStep {
            confirmation,
            committer,
        });
        self
    }

    pub async fn run(&self, objective: &str) -> RunReport {
        let mut state = RunState::new(objective.trim());
        let mut outputs = Outputs::default();
        info!("run {} started: {}", state.run_id, state.objective);
        self.emit(
            &state,
            RunEvent::RunStarted {
                objective: state.objective.clone(),
            },
        )
        .await;

        let failure = match self.drive(&mut state, &mut outputs).await {
            Ok(()) => {
                info!(
                    "run {} finished in {} with {} accepted change(s)",
                    state.run_id,
                    state.phase.name(),
                    state.changelog.len()
                );
                self.emit(
                    &state,
                    RunEvent::RunCompleted {
                        phase: state.phase.name().to_string(),
                        changelog_entries: state.changelog.len(),
                    },
                )
                .await;
                None
            }
            Err(err) => {
                let failure = RunFailure::new(state.phase, err);
                error!("run {}: {failure}", state.run_id);
                state.fail();
                self.emit(
                    &state,
                    RunEvent::RunFailed {
                        phase: failure.phase.name().to_string(),
                        subtask_id: failure.subtask_id,
                        error: failure.error.to_string(),
                    },
                )
                .await;
                Some(failure)
            }
        };

        RunReport {
            state,
            documentation: outputs.documentation,
            commit: outputs.commit,
            failure,
        }
    }

    async fn drive(&self, state: &mut RunState, outputs: &mut Outputs) -> Result<(), AgentError> {
        let plan = self.agents.manager.plan(&state.objective).await?;
        state.apply_plan(plan)?;
        info!(
            "plan ready: {} sub-task(s), {} doc request(s)",
            state.subtasks.len(),
            state.doc_requests.len()
        );
        self.emit(
            state,
            RunEvent::PlanReady {
                subtasks: state.subtasks.iter().map(|s| s.description.clone()).collect(),
                doc_requests: state.doc_requests.clone(),
            },
        )
        .await;

        let ids: Vec<u32> = state.subtasks.iter().map(|s| s.id).collect();
        for id in ids {
            self.develop_subtask(state, id).await?;
        }

        state.transition(RunPhase::Documenting)?;
        let docs = self
            .agents
            .doc
            .document(&state.objective, &state.changelog, &state.doc_requests)
            .await?;
        self.emit(
            state,
            RunEvent::Documented {
                commit_message: docs.commit_message.clone(),
            },
        )
        .await;
        outputs.documentation = Some(docs.clone());

        let Some(step) = &self.commit else {
            self.skip_commit(state, "no repository configured").await;
            return Ok(());
        };
        if !step.confirmation.confirm(&docs).await {
            self.skip_commit(state, "commit not confirmed").await;
            return Ok(());
        }

        state.transition(RunPhase::Committing)?;
        info!("committing via {}", step.committer.name());
        let outcome = step
            .committer
            .commit(&state.changelog, &docs)
            .await
            .map_err(|e| AgentError::Commit(e.to_string()))?;
        let event = match &outcome.commit {
            Some(sha) => RunEvent::Committed {
                commit: sha.clone(),
                pushed: outcome.pushed,
            },
            None => RunEvent::CommitSkipped {
                reason: "nothing to commit".into(),
            },
        };
        self.emit(state, event).await;
        outputs.commit = Some(outcome);
        state.transition(RunPhase::Done)
    }

    /// Bounded Dev/QA loop for one sub-task. Any error leaves the sub-task
    /// `Failed` with a `subtask_failed` event.
    async fn develop_subtask(&self, state: &mut RunState, id: u32) -> Result<(), AgentError> {
        let Err(err) = self.attempt_subtask(state, id).await else {
            return Ok(());
        };

        let attempts = match state.subtask(id) {
            Some(subtask) if !subtask.status.is_finished() => subtask.attempts,
            _ => return Err(err),
        };
        state.mark_failed(id)?;
        let feedback = match &err {
            AgentError::RetryBudgetExceeded { feedback, .. } => feedback.clone(),
            other => other.to_string(),
        };
        self.emit(
            state,
            RunEvent::SubtaskFailed {
                subtask_id: id,
                attempts,
                feedback,
            },
        )
        .await;
        Err(err)
    }

    async fn attempt_subtask(&self, state: &mut RunState, id: u32) -> Result<(), AgentError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut retry: Option<Retry> = None;

        for attempt in 1..=max_attempts {
            state.transition(RunPhase::Developing {
                subtask_id: id,
                attempt,
            })?;
            state.begin_attempt(id)?;
            let subtask = state
                .subtask(id)
                .cloned()
                .ok_or_else(|| AgentError::Invariant(format!("unknown sub-task {id}")))?;
            info!("sub-task {id} attempt {attempt}/{max_attempts}: {}", subtask.description);

            let artifact = self
                .agents
                .dev
                .develop(&state.objective, &subtask, retry.as_ref())
                .await?;
            self.emit(
                state,
                RunEvent::ArtifactProduced {
                    subtask_id: id,
                    attempt,
                    files: artifact.paths(),
                },
            )
            .await;

            state.transition(RunPhase::Reviewing {
                subtask_id: id,
                attempt,
            })?;
            let report = self
                .agents
                .qa
                .review(&state.objective, &subtask, &artifact)
                .await?;
            self.emit(
                state,
                RunEvent::Reviewed {
                    subtask_id: id,
                    attempt,
                    verdict: report.verdict,
                    feedback: report.feedback.clone(),
                },
            )
            .await;

            if report.verdict == Verdict::Pass {
                state.record_pass(id, artifact, report)?;
                info!("sub-task {id} passed after {attempt} attempt(s)");
                self.emit(
                    state,
                    RunEvent::SubtaskPassed {
                        subtask_id: id,
                        attempts: attempt,
                    },
                )
                .await;
                return Ok(());
            }

            warn!("sub-task {id} attempt {attempt} rejected");
            retry = Some(Retry {
                previous: artifact,
                feedback: report.feedback,
            });
        }

        Err(AgentError::RetryBudgetExceeded {
            subtask_id: id,
            attempts: max_attempts,
            feedback: retry.map(|r| r.feedback).unwrap_or_default(),
        })
    }

    async fn skip_commit(&self, state: &RunState, reason: &str) {
        info!("commit skipped: {reason}");
        self.emit(
            state,
            RunEvent::CommitSkipped {
                reason: reason.to_string(),
            },
        )
        .await;
    }

    /// Log an event. A failing log never fails the run.
    async fn emit(&self, state: &RunState, event: RunEvent) {
        let Some(ref log) = self.event_log else {
            return;
        };
        let record = EventRecord::now(&state.run_id, event);
        if let Err(e) = log.append(&record).await {
            warn!("failed to write {} event to {}: {e}", record.event.kind(), log.dir().display());
        }
    }
}
