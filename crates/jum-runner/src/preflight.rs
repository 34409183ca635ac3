use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use jum_llm::HttpModelClient;
use tracing::info;

/// Run all preflight checks before starting a run.
pub async fn run_all(client: &HttpModelClient, repo_dir: Option<&Path>) -> Result<()> {
    check_model_server(client).await?;
    if let Some(dir) = repo_dir {
        check_git()?;
        check_repo(dir)?;
    }
    info!("all preflight checks passed");
    Ok(())
}

async fn check_model_server(client: &HttpModelClient) -> Result<()> {
    client
        .health_check()
        .await
        .context("model server is not reachable. Is it running? Check LLM_BASE_URL")?;
    info!("model server: reachable (model {})", client.model());
    Ok(())
}

fn check_git() -> Result<()> {
    let output = Command::new("git")
        .arg("--version")
        .output()
        .context("git is not installed. Install git and try again.")?;
    if !output.status.success() {
        bail!("git --version failed");
    }
    let version = String::from_utf8_lossy(&output.stdout);
    info!("git: {}", version.trim());
    Ok(())
}

fn check_repo(dir: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir)
        .output()
        .with_context(|| format!("failed to inspect {}", dir.display()))?;
    if !output.status.success() {
        bail!(
            "{} is not inside a git repository. Set --repo-dir or JUM_REPO_DIR",
            dir.display()
        );
    }
    let top = String::from_utf8_lossy(&output.stdout);
    info!("repository: {}", top.trim());
    Ok(())
}
