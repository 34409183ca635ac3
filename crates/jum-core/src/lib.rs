pub mod artifact;
pub mod error;
pub mod event;
pub mod role;
pub mod run;
pub mod subtask;
pub mod verification;

pub use artifact::{CodeArtifact, QaReport, Verdict};
pub use error::{AgentError, RunFailure};
pub use event::{EventRecord, RunEvent};
pub use role::AgentRole;
pub use run::{ChangelogEntry, RunPhase, RunState};
pub use subtask::{PlannedTask, SubTask, SubTaskStatus, TaskKind};
