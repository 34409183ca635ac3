use std::sync::Arc;

use async_trait::async_trait;
use jum_core::verification::VerificationStep;
use jum_core::{AgentError, AgentRole, CodeArtifact, QaReport, SubTask, Verdict};
use jum_llm::{CompletionOptions, ModelClient};
use jum_prompts::{assemble_prompt, system_prompt, PromptContext};
use jum_verify::{Runner, Sandbox, SandboxError};
use tracing::{info, warn};

use super::QaAgent;

/// Reviews an artifact by asking the model for a `VERDICT:` line.
pub struct ReviewQa {
    client: Arc<dyn ModelClient>,
}

impl ReviewQa {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QaAgent for ReviewQa {
    async fn review(
        &self,
        objective: &str,
        subtask: &SubTask,
        artifact: &CodeArtifact,
    ) -> Result<QaReport, AgentError> {
        let mut ctx = PromptContext::for_objective(objective);
        ctx.subtask = Some(subtask.clone());
        ctx.artifact = Some(artifact.clone());

        let prompt = assemble_prompt(&ctx, AgentRole::Qa);
        let options =
            CompletionOptions::for_role(AgentRole::Qa).with_system(system_prompt(AgentRole::Qa));
        let response = self.client.complete(&prompt, &options).await?;

        let report = parse_review(&response);
        info!(
            "sub-task {}: {} review verdict {}",
            subtask.id,
            self.client.name(),
            report.verdict
        );
        Ok(report)
    }
}

/// Read the last `VERDICT: PASS|FAIL` line. A review without one fails.
pub fn parse_review(response: &str) -> QaReport {
    let lines: Vec<&str> = response.lines().collect();
    let found = lines
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, line)| verdict_of(line).map(|v| (i, v)));

    let Some((index, verdict)) = found else {
        return QaReport::fail(format!(
            "review did not end with a VERDICT line:\n{}",
            response.trim()
        ));
    };

    let feedback = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, l)| *l)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    QaReport { verdict, feedback }
}

fn verdict_of(line: &str) -> Option<Verdict> {
    let cleaned: String = line
        .chars()
        .filter(|c| !matches!(c, '*' | '`' | '#'))
        .collect();
    let cleaned = cleaned.trim();
    let head = cleaned.get(..7)?;
    if !head.eq_ignore_ascii_case("verdict") {
        return None;
    }
    let rest = cleaned[7..].trim_start().strip_prefix(':')?.trim();
    let word: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    Verdict::parse_str(&word)
}

/// Reviews an artifact by running checks against it in a scratch directory,
/// then optionally handing passing artifacts to a model review.
pub struct SandboxQa {
    steps: Vec<VerificationStep>,
    runner: Runner,
    review: Option<ReviewQa>,
}

impl SandboxQa {
    pub fn new(steps: Vec<VerificationStep>) -> Self {
        Self {
            steps,
            runner: Runner::new(),
            review: None,
        }
    }

    /// Also require a model review once every check passes.
    pub fn with_review(mut self, review: ReviewQa) -> Self {
        self.review = Some(review);
        self
    }
}

#[async_trait]
impl QaAgent for SandboxQa {
    async fn review(
        &self,
        objective: &str,
        subtask: &SubTask,
        artifact: &CodeArtifact,
    ) -> Result<QaReport, AgentError> {
        let files = artifact.clone();
        let materialized = tokio::task::spawn_blocking(move || Sandbox::materialize(&files))
            .await
            .map_err(|e| AgentError::Invariant(format!("sandbox task failed: {e}")))?;
        let sandbox = match materialized {
            Ok(s) => s,
            Err(SandboxError::UnsafePath(path)) => {
                return Ok(QaReport::fail(format!(
                    "artifact writes outside the repository: {path}"
                )));
            }
            Err(SandboxError::Write { path, source }) => {
                warn!("sub-task {}: cannot materialize {path}: {source}", subtask.id);
                return Ok(QaReport::fail(format!("cannot materialize {path}: {source}")));
            }
            Err(SandboxError::Create(e)) => return Err(AgentError::Io(e)),
        };

        let result = self.runner.execute(&self.steps, sandbox.path()).await;
        if !result.passed() {
            warn!("sub-task {}: checks failed", subtask.id);
            return Ok(QaReport::fail(result.failure_report()));
        }
        info!("sub-task {}: {} check(s) passed", subtask.id, result.steps.len());

        match &self.review {
            Some(review) => review.review(objective, subtask, artifact).await,
            None => Ok(QaReport::pass(result.summary())),
        }
    }
}
