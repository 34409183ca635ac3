use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use jum_core::verification::VerificationStep;
use jum_llm::HttpModelClient;
use jum_verify::profiles::find_profile;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "jum",
    about = "Plan, write, review and document code changes with a local LLM"
)]
pub struct RunnerConfig {
    /// What the agents should build
    #[arg(required = true, num_args = 1..)]
    pub objective: Vec<String>,

    /// Base URL of an OpenAI-compatible chat-completion server
    #[arg(long, env = "LLM_BASE_URL", default_value = "http://localhost:11434/v1")]
    pub base_url: String,

    /// Model name sent with every request
    #[arg(long, env = "LLM_MODEL", default_value = "mistral:7b")]
    pub model: String,

    /// Bearer token for the model server
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request model timeout (seconds)
    #[arg(long, env = "LLM_TIMEOUT", default_value = "120")]
    pub timeout: u64,

    /// Dev invocations allowed per sub-task before the run fails
    #[arg(
        long,
        env = "JUM_MAX_ATTEMPTS",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Directory for the JSONL event log
    #[arg(long, env = "LOG_DIR", default_value = "logs/agents")]
    pub log_dir: PathBuf,

    /// Run a builtin check profile (python, rust, node) against each artifact
    #[arg(long)]
    pub qa_profile: Option<String>,

    /// Extra shell check to run against each artifact (repeatable)
    #[arg(long = "check")]
    pub checks: Vec<String>,

    /// Timeout for each `--check` command (seconds)
    #[arg(long, default_value = "300")]
    pub check_timeout: u64,

    /// Repository the accepted changes are written into
    #[arg(long, env = "JUM_REPO_DIR", default_value = ".")]
    pub repo_dir: PathBuf,

    /// Token injected into HTTPS remotes when pushing
    #[arg(long, env = "JUM_REPO_TOKEN", hide_env_values = true)]
    pub repo_token: Option<String>,

    /// Write and commit the accepted changes after documenting
    #[arg(long)]
    pub commit: bool,

    /// Push the new commit to origin
    #[arg(long, requires = "commit")]
    pub push: bool,

    /// Skip the model server and git checks at startup
    #[arg(long)]
    pub skip_preflight: bool,
}

/// Connection settings for the model server. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ModelSettings {
    pub fn build_client(&self) -> HttpModelClient {
        let client = HttpModelClient::new(&self.base_url, self.model.clone()).with_timeout(self.timeout);
        match &self.api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub max_attempts: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RunnerConfig {
    pub fn objective(&self) -> Result<String> {
        let objective = self.objective.join(" ").trim().to_string();
        if objective.is_empty() {
            bail!("objective must not be empty");
        }
        Ok(objective)
    }

    pub fn model_settings(&self) -> Result<ModelSettings> {
        let parsed = url::Url::parse(&self.base_url)
            .with_context(|| format!("invalid --base-url {:?}", self.base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("--base-url must be http or https, got {}", parsed.scheme());
        }
        if self.timeout == 0 {
            bail!("--timeout must be at least 1 second");
        }
        if self.model.trim().is_empty() {
            bail!("--model must not be empty");
        }

        Ok(ModelSettings {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model: self.model.trim().to_string(),
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(self.timeout),
        })
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            max_attempts: self.max_attempts,
        }
    }

    /// Checks to run against each artifact: the chosen profile's steps, then
    /// every `--check`. Empty means review-only QA.
    pub fn verification_steps(&self) -> Result<Vec<VerificationStep>> {
        let mut steps = Vec::new();
        if let Some(ref name) = self.qa_profile {
            let Some(profile) = find_profile(name) else {
                bail!("unknown --qa-profile {name:?} (expected python, rust or node)");
            };
            steps.extend(profile.to_steps());
        }
        for (i, command) in self.checks.iter().enumerate() {
            steps.push(VerificationStep::new(
                format!("check {}", i + 1),
                command.clone(),
                self.check_timeout,
            ));
        }
        Ok(steps)
    }
}

/// Load `.env` from the working directory or the nearest parent that has
/// one. Variables already set in the environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => debug!("ignoring .env: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunnerConfig {
        let mut argv = vec!["jum"];
        argv.extend_from_slice(args);
        RunnerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn objective_words_are_joined() {
        let config = parse(&["write", "a", "word", "counter"]);
        assert_eq!(config.objective().unwrap(), "write a word counter");
    }

    #[test]
    fn missing_objective_is_rejected() {
        assert!(RunnerConfig::try_parse_from(["jum"]).is_err());
        assert!(parse(&["  "]).objective().is_err());
    }

    #[test]
    fn model_settings_from_flags() {
        let config = parse(&[
            "--base-url",
            "http://gpu-box:8000/v1/",
            "--model",
            "qwen",
            "--api-key",
            "k",
            "--timeout",
            "30",
            "x",
        ]);
        let settings = config.model_settings().unwrap();
        assert_eq!(settings.base_url, "http://gpu-box:8000/v1");
        assert_eq!(settings.model, "qwen");
        assert_eq!(settings.api_key.as_deref(), Some("k"));
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.build_client().model(), "qwen");
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(parse(&["--base-url", "not a url", "x"]).model_settings().is_err());
        assert!(parse(&["--base-url", "ftp://host/v1", "x"]).model_settings().is_err());
        assert!(parse(&["--timeout", "0", "x"]).model_settings().is_err());
    }

    #[test]
    fn max_attempts_must_be_positive() {
        assert!(RunnerConfig::try_parse_from(["jum", "--max-attempts", "0", "x"]).is_err());
        assert_eq!(parse(&["--max-attempts", "5", "x"]).orchestrator_settings().max_attempts, 5);
    }

    #[test]
    fn push_requires_commit() {
        assert!(RunnerConfig::try_parse_from(["jum", "--push", "x"]).is_err());
        let config = parse(&["--commit", "--push", "x"]);
        assert!(config.commit && config.push);
    }

    #[test]
    fn verification_steps_from_profile_and_checks() {
        let config = parse(&["--qa-profile", "Rust", "--check", "make lint", "--check", "true", "x"]);
        let steps = config.verification_steps().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[2].command, "make lint");
        assert_eq!(steps[3].name, "check 2");
        assert_eq!(steps[3].timeout_s, 300);

        assert!(parse(&["x"]).verification_steps().unwrap().is_empty());
        assert!(parse(&["--qa-profile", "cobol", "x"]).verification_steps().is_err());
    }
}
