use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use jum_llm::ModelClient;
use jum_runner::agents::{Agents, LlmDev, LlmDoc, LlmManager, QaAgent, ReviewQa, SandboxQa};
use jum_runner::commit::{AssumeYes, CommitConfirmation, Deny, GitCommitter};
use jum_runner::config::{self, RunnerConfig};
use jum_runner::event_log::EventLog;
use jum_runner::{preflight, Orchestrator};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    config::load_dotenv();
    let config = RunnerConfig::parse();
    let objective = config.objective()?;
    let model = config.model_settings()?;
    let steps = config.verification_steps()?;
    info!("model: {} at {}", model.model, model.base_url);

    let http = model.build_client();
    if config.skip_preflight {
        info!("skipping preflight checks");
    } else {
        let repo_dir = config.commit.then_some(config.repo_dir.as_path());
        preflight::run_all(&http, repo_dir).await?;
    }
    let client: Arc<dyn ModelClient> = Arc::new(http);

    let qa: Arc<dyn QaAgent> = if steps.is_empty() {
        Arc::new(ReviewQa::new(client.clone()))
    } else {
        info!("QA runs {} check(s) before review", steps.len());
        Arc::new(SandboxQa::new(steps).with_review(ReviewQa::new(client.clone())))
    };
    let agents = Agents {
        manager: Arc::new(LlmManager::new(client.clone())),
        dev: Arc::new(LlmDev::new(client.clone())),
        qa,
        doc: Arc::new(LlmDoc::new(client)),
    };

    let mut committer = GitCommitter::new(&config.repo_dir);
    if config.push {
        committer = committer.with_push(config.repo_token.clone());
    }
    let confirmation: Box<dyn CommitConfirmation> = if config.commit {
        Box::new(AssumeYes)
    } else {
        Box::new(Deny)
    };

    let orchestrator = Orchestrator::new(agents, config.orchestrator_settings())
        .with_event_log(EventLog::new(&config.log_dir))
        .with_commit(confirmation, Box::new(committer));

    let report = orchestrator.run(&objective).await;
    print!("{}", report.render());

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
