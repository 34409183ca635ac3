//! Run-level behavior of the orchestrator with scripted agents.

use jum_core::{
    AgentError, CodeArtifact, PlannedTask, QaReport, RunPhase, SubTask, SubTaskStatus, TaskKind,
    Verdict,
};
use jum_runner::agents::mock::{MockAgents, MockDev, MockDoc, MockManager, MockQa};
use jum_runner::agents::QaAgent;
use jum_runner::commit::mock::MockCommitter;
use jum_runner::commit::{AssumeYes, Deny};
use jum_runner::config::OrchestratorSettings;
use jum_runner::event_log::EventLog;
use jum_runner::Orchestrator;

struct BrokenQa;

#[async_trait::async_trait]
impl QaAgent for BrokenQa {
    async fn review(
        &self,
        _objective: &str,
        _subtask: &SubTask,
        _artifact: &CodeArtifact,
    ) -> Result<QaReport, AgentError> {
        Err(AgentError::Io(std::io::Error::other("no space left for sandbox")))
    }
}

fn settings(max_attempts: u32) -> OrchestratorSettings {
    OrchestratorSettings { max_attempts }
}

fn mocks(tasks: usize, verdicts: Vec<Verdict>) -> MockAgents {
    MockAgents::new(
        MockManager::with_dev_tasks(tasks),
        MockDev::new(),
        MockQa::with_verdicts(verdicts),
        MockDoc::new(),
    )
}

#[tokio::test]
async fn third_attempt_passes_within_budget() {
    let mocks = mocks(1, vec![Verdict::Fail, Verdict::Fail, Verdict::Pass]);
    let report = Orchestrator::new(mocks.agents(), settings(3))
        .run("count words")
        .await;

    assert_eq!(*report.phase(), RunPhase::Documenting);
    assert!(report.failure.is_none());
    assert_eq!(mocks.dev.call_count(), 3);
    assert_eq!(mocks.qa.review_count(), 3);

    let entry = &report.state.changelog[0];
    assert_eq!(entry.attempts, 3);
    assert_eq!(entry.artifact.rationale, "call 3");
    assert_eq!(entry.artifact.files["task1.py"], "# call 3\n");
}

#[tokio::test]
async fn retries_carry_the_latest_feedback() {
    let mocks = mocks(1, vec![Verdict::Fail, Verdict::Fail]);
    Orchestrator::new(mocks.agents(), settings(3)).run("o").await;

    let calls = mocks.dev.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].feedback, None);
    assert_eq!(calls[1].feedback.as_deref(), Some("review 1: sub-task 1 is wrong"));
    assert_eq!(calls[2].feedback.as_deref(), Some("review 2: sub-task 1 is wrong"));
}

#[tokio::test]
async fn exhausted_budget_fails_without_changelog_entry() {
    let mocks = mocks(1, vec![Verdict::Fail, Verdict::Fail, Verdict::Pass]);
    let report = Orchestrator::new(mocks.agents(), settings(2)).run("o").await;

    assert_eq!(*report.phase(), RunPhase::Failed);
    assert_eq!(mocks.dev.call_count(), 2);
    assert!(report.state.changelog.is_empty());
    assert_eq!(report.state.subtasks[0].status, SubTaskStatus::Failed);
    assert_eq!(mocks.doc.call_count(), 0);

    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.subtask_id, Some(1));
    assert!(matches!(
        failure.error,
        AgentError::RetryBudgetExceeded { subtask_id: 1, attempts: 2, .. }
    ));
}

#[tokio::test]
async fn budget_of_one_means_a_single_attempt() {
    let mocks = mocks(1, vec![Verdict::Fail]);
    let report = Orchestrator::new(mocks.agents(), settings(1)).run("o").await;
    assert_eq!(*report.phase(), RunPhase::Failed);
    assert_eq!(mocks.dev.call_count(), 1);
}

#[tokio::test]
async fn changelog_has_one_entry_per_passed_subtask_in_order() {
    let mocks = mocks(3, vec![Verdict::Pass, Verdict::Fail, Verdict::Pass, Verdict::Pass]);
    let report = Orchestrator::new(mocks.agents(), settings(3)).run("o").await;

    assert!(report.is_success());
    let ids: Vec<u32> = report.state.changelog.iter().map(|e| e.subtask_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(report.state.changelog.iter().all(|e| e.report.is_pass()));
    assert_eq!(report.state.changelog[1].attempts, 2);
    assert_eq!(report.state.passed_count(), 3);
}

#[tokio::test]
async fn later_failure_keeps_earlier_entries_as_partial_output() {
    // task 1 passes, task 2 never does
    let mocks = mocks(3, vec![Verdict::Pass, Verdict::Fail, Verdict::Fail]);
    let report = Orchestrator::new(mocks.agents(), settings(2)).run("o").await;

    assert_eq!(*report.phase(), RunPhase::Failed);
    assert_eq!(report.state.changelog.len(), 1);
    assert_eq!(report.state.changelog[0].subtask_id, 1);
    assert_eq!(report.state.subtasks[2].status, SubTaskStatus::Pending);
    assert!(report.documentation.is_none());
    assert_eq!(report.failure.unwrap().subtask_id, Some(2));
}

#[tokio::test]
async fn planning_failure_is_reported_in_planning_phase() {
    let mocks = MockAgents::new(
        MockManager::failing("model rambled"),
        MockDev::new(),
        MockQa::new(),
        MockDoc::new(),
    );
    let report = Orchestrator::new(mocks.agents(), settings(3)).run("o").await;

    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.phase, RunPhase::Planning);
    assert!(matches!(failure.error, AgentError::Planning(_)));
    assert_eq!(mocks.dev.call_count(), 0);
}

#[tokio::test]
async fn doc_only_plan_is_a_planning_error() {
    let mocks = MockAgents::new(
        MockManager::new(vec![PlannedTask::new("write docs", TaskKind::Doc)]),
        MockDev::new(),
        MockQa::new(),
        MockDoc::new(),
    );
    let report = Orchestrator::new(mocks.agents(), settings(3)).run("o").await;
    assert!(matches!(
        report.failure.map(|f| f.error),
        Some(AgentError::Planning(_))
    ));
}

#[tokio::test]
async fn doc_requests_do_not_enter_the_dev_loop() {
    let mocks = MockAgents::new(
        MockManager::new(vec![
            PlannedTask::dev("write wc.py"),
            PlannedTask::new("document flags", TaskKind::Doc),
            PlannedTask::new("test empty input", TaskKind::Qa),
        ]),
        MockDev::new(),
        MockQa::new(),
        MockDoc::new(),
    );
    let report = Orchestrator::new(mocks.agents(), settings(3)).run("o").await;

    assert_eq!(mocks.dev.call_count(), 2);
    assert_eq!(report.state.doc_requests, vec!["document flags"]);
    assert_eq!(
        report.documentation.unwrap().readme_update,
        "2 change(s), 1 request(s)"
    );
}

#[tokio::test]
async fn dev_error_aborts_without_retry() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::new(dir.path());
    let mocks = MockAgents::new(
        MockManager::with_dev_tasks(2),
        MockDev::failing_on_call(2),
        MockQa::new(),
        MockDoc::new(),
    );
    let report = Orchestrator::new(mocks.agents(), settings(3))
        .with_event_log(log.clone())
        .run("o")
        .await;

    let failure = report.failure.expect("failure recorded");
    assert!(matches!(failure.error, AgentError::Generation(_)));
    assert_eq!(
        failure.phase,
        RunPhase::Developing {
            subtask_id: 2,
            attempt: 1
        }
    );
    assert_eq!(mocks.dev.call_count(), 2);
    assert_eq!(report.state.changelog.len(), 1);
    assert_eq!(report.state.subtasks[0].status, SubTaskStatus::Passed);
    assert_eq!(report.state.subtasks[1].status, SubTaskStatus::Failed);
    assert_eq!(report.state.subtasks[1].attempts, 1);

    let records = log
        .read_events(report.state.started_at.date_naive())
        .await
        .unwrap();
    let kinds: Vec<&str> = records.iter().map(|r| r.event.kind()).collect();
    assert_eq!(&kinds[kinds.len() - 2..], ["subtask_failed", "run_failed"]);
}

#[tokio::test]
async fn qa_error_marks_the_subtask_failed() {
    let mocks = MockAgents::new(
        MockManager::with_dev_tasks(1),
        MockDev::new(),
        MockQa::new(),
        MockDoc::new(),
    );
    let mut agents = mocks.agents();
    agents.qa = std::sync::Arc::new(BrokenQa);
    let report = Orchestrator::new(agents, settings(3)).run("o").await;

    let failure = report.failure.expect("failure recorded");
    assert!(matches!(failure.error, AgentError::Io(_)));
    assert_eq!(
        failure.phase,
        RunPhase::Reviewing {
            subtask_id: 1,
            attempt: 1
        }
    );
    assert_eq!(report.state.subtasks[0].status, SubTaskStatus::Failed);
    assert_eq!(mocks.dev.call_count(), 1);
}

#[tokio::test]
async fn doc_failure_fails_in_documenting() {
    let mocks = MockAgents::new(
        MockManager::with_dev_tasks(1),
        MockDev::new(),
        MockQa::new(),
        MockDoc::failing(),
    );
    let report = Orchestrator::new(mocks.agents(), settings(3)).run("o").await;
    assert_eq!(report.failure.unwrap().phase, RunPhase::Documenting);
    assert_eq!(report.state.changelog.len(), 1);
}

#[tokio::test]
async fn declined_commit_stays_in_documenting() {
    let mocks = mocks(1, vec![]);
    let committer = std::sync::Arc::new(MockCommitter::new());
    let report = Orchestrator::new(mocks.agents(), settings(3))
        .with_commit(Box::new(Deny), Box::new(committer.clone()))
        .run("o")
        .await;

    assert_eq!(*report.phase(), RunPhase::Documenting);
    assert!(report.commit.is_none());
    assert!(committer.messages().is_empty());
}

#[tokio::test]
async fn confirmed_commit_reaches_done() {
    let mocks = mocks(2, vec![]);
    let committer = std::sync::Arc::new(MockCommitter::new());
    let report = Orchestrator::new(mocks.agents(), settings(3))
        .with_commit(Box::new(AssumeYes), Box::new(committer.clone()))
        .run("o")
        .await;

    assert_eq!(*report.phase(), RunPhase::Done);
    assert!(report.is_success());
    assert_eq!(committer.messages(), vec!["Implement task 1, task 2"]);
    assert!(report.commit.unwrap().commit.is_some());
}

#[tokio::test]
async fn commit_failure_fails_in_committing() {
    let mocks = mocks(1, vec![]);
    let report = Orchestrator::new(mocks.agents(), settings(3))
        .with_commit(Box::new(AssumeYes), Box::new(MockCommitter::new().with_commit_fail()))
        .run("o")
        .await;

    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.phase, RunPhase::Committing);
    assert!(matches!(failure.error, AgentError::Commit(_)));
    assert!(report.documentation.is_some());
}

#[tokio::test]
async fn events_are_logged_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::new(dir.path());
    let mocks = mocks(1, vec![Verdict::Fail, Verdict::Pass]);
    let report = Orchestrator::new(mocks.agents(), settings(3))
        .with_event_log(log.clone())
        .run("o")
        .await;

    let records = log
        .read_events(report.state.started_at.date_naive())
        .await
        .unwrap();
    let kinds: Vec<&str> = records.iter().map(|r| r.event.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "run_started",
            "plan_ready",
            "artifact_produced",
            "reviewed",
            "artifact_produced",
            "reviewed",
            "subtask_passed",
            "documented",
            "commit_skipped",
            "run_completed",
        ]
    );
    assert!(records.iter().all(|r| r.run_id == report.state.run_id));
}

#[tokio::test]
async fn unwritable_event_log_does_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();
    let mocks = mocks(1, vec![]);
    let report = Orchestrator::new(mocks.agents(), settings(3))
        .with_event_log(EventLog::new(blocker.join("logs")))
        .run("o")
        .await;
    assert!(report.is_success());
}
