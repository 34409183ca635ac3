//! Scripted agents for exercising the orchestrator without a model.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jum_core::{
    AgentError, ChangelogEntry, CodeArtifact, PlannedTask, QaReport, SubTask, Verdict,
};

use super::{Agents, DevAgent, DocAgent, Documentation, ManagerAgent, QaAgent, Retry};

/// Returns a fixed plan, or a fixed planning error.
pub struct MockManager {
    plan: Vec<PlannedTask>,
    fail: Option<String>,
}

impl MockManager {
    pub fn new(plan: Vec<PlannedTask>) -> Self {
        Self { plan, fail: None }
    }

    /// A plan of `n` dev sub-tasks named "task 1".."task n".
    pub fn with_dev_tasks(n: usize) -> Self {
        Self::new((1..=n).map(|i| PlannedTask::dev(format!("task {i}"))).collect())
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            plan: Vec::new(),
            fail: Some(message.into()),
        }
    }
}

#[async_trait]
impl ManagerAgent for MockManager {
    async fn plan(&self, _objective: &str) -> Result<Vec<PlannedTask>, AgentError> {
        match &self.fail {
            Some(msg) => Err(AgentError::Planning(msg.clone())),
            None => Ok(self.plan.clone()),
        }
    }
}

/// One recorded Dev invocation.
#[derive(Debug, Clone)]
pub struct DevCall {
    pub subtask_id: u32,
    pub feedback: Option<String>,
}

/// Produces `task<id>.py` whose content names the call number, so every
/// attempt yields a distinguishable artifact.
#[derive(Default)]
pub struct MockDev {
    calls: Mutex<Vec<DevCall>>,
    fail_on_call: Option<usize>,
}

impl MockDev {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a generation error on the given 1-based call.
    pub fn failing_on_call(call: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
        }
    }

    pub fn calls(&self) -> Vec<DevCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DevAgent for MockDev {
    async fn develop(
        &self,
        _objective: &str,
        subtask: &SubTask,
        retry: Option<&Retry>,
    ) -> Result<CodeArtifact, AgentError> {
        let call = {
            let mut calls = self
                .calls
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            calls.push(DevCall {
                subtask_id: subtask.id,
                feedback: retry.map(|r| r.feedback.clone()),
            });
            calls.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(AgentError::Generation("mock generation failure".into()));
        }
        Ok(CodeArtifact::new(format!("call {call}"))
            .with_file(format!("task{}.py", subtask.id), format!("# call {call}\n")))
    }
}

/// Hands out scripted verdicts in order, then passes everything.
#[derive(Default)]
pub struct MockQa {
    verdicts: Mutex<VecDeque<Verdict>>,
    reviews: AtomicUsize,
}

impl MockQa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdicts(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into_iter().collect()),
            reviews: AtomicUsize::new(0),
        }
    }

    pub fn review_count(&self) -> usize {
        self.reviews.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QaAgent for MockQa {
    async fn review(
        &self,
        _objective: &str,
        subtask: &SubTask,
        _artifact: &CodeArtifact,
    ) -> Result<QaReport, AgentError> {
        let n = self.reviews.fetch_add(1, Ordering::SeqCst) + 1;
        let verdict = self
            .verdicts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or(Verdict::Pass);
        Ok(match verdict {
            Verdict::Pass => QaReport::pass(format!("review {n}: ok")),
            Verdict::Fail => QaReport::fail(format!("review {n}: sub-task {} is wrong", subtask.id)),
        })
    }
}

/// Derives documentation from the changelog alone.
#[derive(Default)]
pub struct MockDoc {
    calls: AtomicUsize,
    fail: bool,
}

impl MockDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocAgent for MockDoc {
    async fn document(
        &self,
        _objective: &str,
        changelog: &[ChangelogEntry],
        doc_requests: &[String],
    ) -> Result<Documentation, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AgentError::Upstream("mock doc failure".into()));
        }
        let descriptions: Vec<&str> = changelog.iter().map(|e| e.description.as_str()).collect();
        Ok(Documentation {
            readme_update: format!("{} change(s), {} request(s)", changelog.len(), doc_requests.len()),
            changelog_md: descriptions
                .iter()
                .map(|d| format!("- {d}"))
                .collect::<Vec<_>>()
                .join("\n"),
            commit_message: format!("Implement {}", descriptions.join(", ")),
        })
    }
}

/// Shared handles to a full set of mock agents, kept so tests can inspect
/// them after a run.
pub struct MockAgents {
    pub manager: Arc<MockManager>,
    pub dev: Arc<MockDev>,
    pub qa: Arc<MockQa>,
    pub doc: Arc<MockDoc>,
}

impl MockAgents {
    pub fn new(manager: MockManager, dev: MockDev, qa: MockQa, doc: MockDoc) -> Self {
        Self {
            manager: Arc::new(manager),
            dev: Arc::new(dev),
            qa: Arc::new(qa),
            doc: Arc::new(doc),
        }
    }

    pub fn agents(&self) -> Agents {
        Agents {
            manager: self.manager.clone(),
            dev: self.dev.clone(),
            qa: self.qa.clone(),
            doc: self.doc.clone(),
        }
    }
}
