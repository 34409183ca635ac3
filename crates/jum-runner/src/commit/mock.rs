use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use jum_core::ChangelogEntry;

use super::{CommitError, CommitOutcome, RepoCommitter};
use crate::agents::Documentation;

/// A mock committer for testing that records commit messages and hands out
/// sequential fake SHAs.
pub struct MockCommitter {
    counter: AtomicU64,
    messages: Mutex<Vec<String>>,
    commit_fail: bool,
}

impl Default for MockCommitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCommitter {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
            messages: Mutex::new(Vec::new()),
            commit_fail: false,
        }
    }

    pub fn with_commit_fail(mut self) -> Self {
        self.commit_fail = true;
        self
    }

    /// Commit messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RepoCommitter for MockCommitter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn commit(
        &self,
        _changelog: &[ChangelogEntry],
        docs: &Documentation,
    ) -> Result<CommitOutcome, CommitError> {
        if self.commit_fail {
            return Err(CommitError::Git("mock commit failure".into()));
        }
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(docs.commit_message.clone());
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(CommitOutcome {
            commit: Some(format!("{n:040x}")),
            pushed: false,
        })
    }
}
