pub mod git;
pub mod mock;

use std::collections::BTreeMap;

use async_trait::async_trait;
use jum_core::ChangelogEntry;
use thiserror::Error;

use crate::agents::Documentation;

pub use git::GitCommitter;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("not a git repository: {0}")]
    NotARepo(String),

    #[error("unsafe artifact path: {0}")]
    UnsafePath(String),

    #[error("git failed: {0}")]
    Git(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a commit step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// `None` when the accepted changes left the working tree unchanged.
    pub commit: Option<String>,
    pub pushed: bool,
}

/// Writes accepted changes into a repository and records them.
#[async_trait]
pub trait RepoCommitter: Send + Sync {
    fn name(&self) -> &str;

    async fn commit(
        &self,
        changelog: &[ChangelogEntry],
        docs: &Documentation,
    ) -> Result<CommitOutcome, CommitError>;
}

#[async_trait]
impl<T: RepoCommitter + ?Sized> RepoCommitter for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn commit(
        &self,
        changelog: &[ChangelogEntry],
        docs: &Documentation,
    ) -> Result<CommitOutcome, CommitError> {
        (**self).commit(changelog, docs).await
    }
}

/// Gate in front of the commit step. Nothing is written unless this says yes.
#[async_trait]
pub trait CommitConfirmation: Send + Sync {
    async fn confirm(&self, docs: &Documentation) -> bool;
}

/// Confirms every commit. Used for `--commit`.
pub struct AssumeYes;

#[async_trait]
impl CommitConfirmation for AssumeYes {
    async fn confirm(&self, _docs: &Documentation) -> bool {
        true
    }
}

/// Declines every commit; the run stops after documenting.
pub struct Deny;

#[async_trait]
impl CommitConfirmation for Deny {
    async fn confirm(&self, _docs: &Documentation) -> bool {
        false
    }
}

/// Final content per path across the changelog. Later entries win.
pub fn merged_files(changelog: &[ChangelogEntry]) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    for entry in changelog {
        for (path, content) in &entry.artifact.files {
            files.insert(path.clone(), content.clone());
        }
    }
    files
}
