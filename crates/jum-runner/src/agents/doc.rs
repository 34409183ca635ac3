use std::sync::Arc;

use async_trait::async_trait;
use jum_core::{AgentError, AgentRole, ChangelogEntry};
use jum_llm::{CompletionOptions, ModelClient};
use jum_prompts::{assemble_prompt, system_prompt, PromptContext};
use tracing::{debug, warn};

use super::{DocAgent, Documentation};

const SUMMARY_LIMIT: usize = 72;

/// Documents a run by asking the model for three `---`-separated sections.
pub struct LlmDoc {
    client: Arc<dyn ModelClient>,
}

impl LlmDoc {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocAgent for LlmDoc {
    async fn document(
        &self,
        objective: &str,
        changelog: &[ChangelogEntry],
        doc_requests: &[String],
    ) -> Result<Documentation, AgentError> {
        let mut ctx = PromptContext::for_objective(objective);
        ctx.changelog = changelog.to_vec();
        ctx.doc_requests = doc_requests.to_vec();

        let prompt = assemble_prompt(&ctx, AgentRole::Doc);
        let options =
            CompletionOptions::for_role(AgentRole::Doc).with_system(system_prompt(AgentRole::Doc));
        let response = self.client.complete(&prompt, &options).await?;
        debug!("doc response from {}: {} chars", self.client.name(), response.len());

        Ok(parse_documentation(&response, changelog))
    }
}

/// Split a Doc response into its three sections. Missing or empty sections
/// are derived from the changelog instead.
pub fn parse_documentation(response: &str, changelog: &[ChangelogEntry]) -> Documentation {
    let mut sections: Vec<String> = vec![String::new()];
    for line in response.lines() {
        if line.trim() == "---" {
            sections.push(String::new());
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }

    let section = |i: usize| {
        sections
            .get(i)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    if sections.len() < 3 {
        warn!(
            "doc response had {} section(s), filling the rest from the changelog",
            sections.len()
        );
    }

    let readme_update = section(0).unwrap_or_else(|| fallback_readme(changelog));
    let changelog_md = section(1).unwrap_or_else(|| fallback_changelog(changelog));
    // A stray `---` inside the commit body must not drop text
    let commit_message = if sections.len() > 3 {
        Some(sections[2..].join("---\n").trim().to_string()).filter(|s| !s.is_empty())
    } else {
        section(2)
    }
    .unwrap_or_else(|| fallback_commit_message(changelog));

    Documentation {
        readme_update,
        changelog_md,
        commit_message,
    }
}

fn fallback_readme(changelog: &[ChangelogEntry]) -> String {
    let mut out = String::from("## Changes\n\n");
    out.push_str(&fallback_changelog(changelog));
    out
}

fn fallback_changelog(changelog: &[ChangelogEntry]) -> String {
    if changelog.is_empty() {
        return "- No changes accepted.".to_string();
    }
    changelog
        .iter()
        .map(|e| {
            let files = e.artifact.paths();
            if files.is_empty() {
                format!("- {}", e.description.trim())
            } else {
                format!("- {} ({})", e.description.trim(), files.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn fallback_commit_message(changelog: &[ChangelogEntry]) -> String {
    match changelog {
        [] => "Update project".to_string(),
        [only] => truncate_summary(only.description.lines().next().unwrap_or("").trim()),
        many => {
            let mut msg = format!("Implement {} sub-tasks\n\n", many.len());
            msg.push_str(&fallback_changelog(many));
            msg
        }
    }
}

fn truncate_summary(line: &str) -> String {
    if line.chars().count() <= SUMMARY_LIMIT {
        return line.to_string();
    }
    let cut: String = line.chars().take(SUMMARY_LIMIT - 3).collect();
    format!("{}...", cut.trim_end())
}
