use jum_core::{ChangelogEntry, CodeArtifact, SubTask};

/// All the context needed to assemble a prompt for any agent role.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub objective: String,
    /// The sub-task being developed or reviewed.
    pub subtask: Option<SubTask>,
    /// Artifact under review (QA), or the rejected previous attempt (Dev retry).
    pub artifact: Option<CodeArtifact>,
    /// QA feedback on the previous attempt.
    pub feedback: Option<String>,
    pub changelog: Vec<ChangelogEntry>,
    pub doc_requests: Vec<String>,
}

impl PromptContext {
    pub fn for_objective(objective: &str) -> Self {
        Self {
            objective: objective.to_string(),
            ..Self::default()
        }
    }

    /// Render the shared preamble: objective and current sub-task.
    pub fn append_preamble(&self, prompt: &mut String) {
        prompt.push_str(&format!("# Objective\n\n{}\n\n", self.objective.trim()));

        if let Some(ref subtask) = self.subtask {
            prompt.push_str(&format!(
                "# Sub-task {} ({})\n\n{}\n\n",
                subtask.id,
                subtask.kind,
                subtask.description.trim()
            ));
        }
    }

    /// Render the changelog as a numbered list of accepted changes.
    pub fn append_changelog(&self, prompt: &mut String) {
        prompt.push_str("## Accepted Changes\n\n");
        if self.changelog.is_empty() {
            prompt.push_str("(none)\n\n");
            return;
        }
        for entry in &self.changelog {
            prompt.push_str(&format!(
                "{}. {}\n",
                entry.subtask_id,
                entry.description.trim()
            ));
            let paths = entry.artifact.paths();
            if !paths.is_empty() {
                prompt.push_str(&format!("   Files: {}\n", paths.join(", ")));
            }
            if !entry.artifact.rationale.trim().is_empty() {
                prompt.push_str(&format!(
                    "   Rationale: {}\n",
                    entry.artifact.rationale.trim()
                ));
            }
        }
        prompt.push('\n');

        if !self.doc_requests.is_empty() {
            prompt.push_str("## Documentation Requests\n\n");
            for req in &self.doc_requests {
                prompt.push_str(&format!("- {}\n", req.trim()));
            }
            prompt.push('\n');
        }
    }
}

/// Render an artifact in the same `### FILE:` block format the Dev agent is
/// asked to produce.
pub fn append_artifact(prompt: &mut String, artifact: &CodeArtifact) {
    for (path, content) in &artifact.files {
        let fence = fence_for(content);
        prompt.push_str(&format!("### FILE: {path}\n{fence}\n"));
        prompt.push_str(content);
        if !content.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push_str(&format!("{fence}\n\n"));
    }
    if !artifact.rationale.trim().is_empty() {
        prompt.push_str("### RATIONALE\n");
        prompt.push_str(artifact.rationale.trim());
        prompt.push_str("\n\n");
    }
}

/// Pick a fence longer than any backtick run inside the content.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat(longest.max(2) + 1)
}
