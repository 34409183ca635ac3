use jum_core::{RunFailure, RunPhase, RunState};

use crate::agents::Documentation;
use crate::commit::CommitOutcome;

/// Everything a finished run hands back to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub documentation: Option<Documentation>,
    pub commit: Option<CommitOutcome>,
    /// Set exactly when `state.phase` is `Failed`. Accepted entries in
    /// `state.changelog` survive a failure as partial output.
    pub failure: Option<RunFailure>,
}

impl RunReport {
    pub fn phase(&self) -> &RunPhase {
        &self.state.phase
    }

    /// Documented, or documented and committed.
    pub fn is_success(&self) -> bool {
        matches!(self.state.phase, RunPhase::Done | RunPhase::Documenting)
    }

    /// Human-readable summary for the terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Run {} finished: {}\n", self.state.run_id, self.state.phase.name()));
        out.push_str(&format!("Objective: {}\n\n", self.state.objective));

        out.push_str("Sub-tasks:\n");
        for s in &self.state.subtasks {
            out.push_str(&format!(
                "  {}. [{}] {} ({} attempt(s)): {}\n",
                s.id, s.kind, s.status, s.attempts, s.description
            ));
        }

        if !self.state.changelog.is_empty() {
            out.push_str("\nAccepted changes:\n");
            for entry in &self.state.changelog {
                out.push_str(&format!(
                    "  {}. {} -> {}\n",
                    entry.subtask_id,
                    entry.description,
                    entry.artifact.paths().join(", ")
                ));
            }
        }

        if let Some(ref failure) = self.failure {
            out.push_str(&format!("\n{failure}\n"));
            if !self.state.changelog.is_empty() {
                out.push_str("Accepted changes above were kept but not committed.\n");
            }
        }

        if let Some(ref docs) = self.documentation {
            out.push_str("\n--- README update ---\n");
            out.push_str(docs.readme_update.trim());
            out.push_str("\n\n--- Changelog ---\n");
            out.push_str(docs.changelog_md.trim());
            out.push_str("\n\n--- Commit message ---\n");
            out.push_str(docs.commit_message.trim());
            out.push('\n');
        }

        match (&self.state.phase, &self.commit) {
            (RunPhase::Done, Some(outcome)) => match &outcome.commit {
                Some(sha) => out.push_str(&format!(
                    "\nCommitted {sha}{}\n",
                    if outcome.pushed { " and pushed" } else { "" }
                )),
                None => out.push_str("\nNothing to commit, working tree clean\n"),
            },
            (RunPhase::Documenting, _) => {
                out.push_str("\nNot committed (pass --commit to write the changes)\n")
            }
            _ => {}
        }

        out
    }
}
