use std::path::Path;

use chrono::Utc;
use jum_core::verification::VerificationStep;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

/// Output beyond this many bytes per stream is cut from the front.
const MAX_OUTPUT_BYTES: usize = 4000;

#[derive(Debug, Clone)]
pub struct Runner;

#[derive(Debug)]
pub struct StepResult {
    pub step_name: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub started_at: chrono::DateTime<Utc>,
    pub finished_at: chrono::DateTime<Utc>,
}

impl StepResult {
    pub fn passed(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
}

#[derive(Debug)]
pub struct RunResult {
    pub status: RunStatus,
    pub steps: Vec<StepResult>,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.status == RunStatus::Passed
    }

    /// Human-readable summary of the failing steps, suitable as QA feedback.
    pub fn failure_report(&self) -> String {
        let mut msg = String::from("Checks failed:\n");
        for step in self.steps.iter().filter(|s| !s.passed()) {
            msg.push_str(&format!(
                "\n--- {} `{}` (exit {}) ---\n",
                step.step_name,
                step.command,
                step.exit_code
                    .map_or("timeout".to_string(), |c| c.to_string()),
            ));
            if !step.stdout.trim().is_empty() {
                msg.push_str(step.stdout.trim_end());
                msg.push('\n');
            }
            if !step.stderr.trim().is_empty() {
                msg.push_str(step.stderr.trim_end());
                msg.push('\n');
            }
        }
        msg
    }

    /// One line per step, for a passing report.
    pub fn summary(&self) -> String {
        self.steps
            .iter()
            .map(|s| {
                format!(
                    "{}: {}",
                    s.step_name,
                    if s.passed() { "ok" } else { "failed" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Runner {
    pub fn new() -> Self {
        Self
    }

    /// Run steps in order, stopping at the first failure.
    pub async fn execute(&self, steps: &[VerificationStep], working_dir: &Path) -> RunResult {
        let mut results = Vec::new();

        for step in steps {
            let dir = step
                .working_dir
                .as_ref()
                .map(|d| working_dir.join(d))
                .unwrap_or_else(|| working_dir.to_path_buf());

            debug!("running check '{}': {}", step.name, step.command);
            let started_at = Utc::now();

            let result = timeout(
                Duration::from_secs(step.timeout_s),
                run_command(&step.command, &dir),
            )
            .await;

            let finished_at = Utc::now();

            let step_result = match result {
                Ok(Ok(output)) => StepResult {
                    step_name: step.name.clone(),
                    command: step.command.clone(),
                    exit_code: output.status.code(),
                    stdout: tail(&String::from_utf8_lossy(&output.stdout)),
                    stderr: tail(&String::from_utf8_lossy(&output.stderr)),
                    started_at,
                    finished_at,
                },
                Ok(Err(e)) => StepResult {
                    step_name: step.name.clone(),
                    command: step.command.clone(),
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!("Process error: {e}"),
                    started_at,
                    finished_at,
                },
                Err(_) => StepResult {
                    step_name: step.name.clone(),
                    command: step.command.clone(),
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!("Timeout after {}s", step.timeout_s),
                    started_at,
                    finished_at,
                },
            };

            let failed = !step_result.passed();
            info!(
                "check '{}' {}",
                step_result.step_name,
                if failed { "failed" } else { "passed" }
            );
            results.push(step_result);

            if failed {
                break;
            }
        }

        let status = if results.iter().all(StepResult::passed) {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        };

        RunResult {
            status,
            steps: results,
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_command(command: &str, dir: &Path) -> std::io::Result<std::process::Output> {
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(dir)
        .kill_on_drop(true)
        .output()
        .await
}

fn tail(s: &str) -> String {
    if s.len() <= MAX_OUTPUT_BYTES {
        return s.to_string();
    }
    let mut start = s.len() - MAX_OUTPUT_BYTES;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &s[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_step(name: &str, command: &str, timeout_s: u64) -> VerificationStep {
        VerificationStep::new(name, command, timeout_s)
    }

    #[tokio::test]
    async fn successful_step() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Runner::new();
        let steps = vec![make_step("echo", "echo ok", 10)];
        let result = runner.execute(&steps, dir.path()).await;
        assert!(result.passed());
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].exit_code, Some(0));
        assert!(result.steps[0].stdout.contains("ok"));
        assert_eq!(result.summary(), "echo: ok");
    }

    #[tokio::test]
    async fn failed_step() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Runner::new();
        let steps = vec![make_step("fail", "echo broken >&2; false", 10)];
        let result = runner.execute(&steps, dir.path()).await;
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.steps[0].exit_code, Some(1));
        let report = result.failure_report();
        assert!(report.contains("fail `echo broken >&2; false` (exit 1)"));
        assert!(report.contains("broken"));
    }

    #[tokio::test]
    async fn stops_on_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Runner::new();
        let steps = vec![
            make_step("first", "echo 1", 10),
            make_step("fail", "false", 10),
            make_step("third", "echo 3", 10),
        ];
        let result = runner.execute(&steps, dir.path()).await;
        assert_eq!(result.steps.len(), 2);
        assert!(!result.passed());
    }

    #[tokio::test]
    async fn timeout_step() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Runner::new();
        let steps = vec![make_step("slow", "sleep 10", 1)];
        let result = runner.execute(&steps, dir.path()).await;
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.steps[0].exit_code, None);
        assert!(result.steps[0].stderr.contains("Timeout"));
        assert!(result.failure_report().contains("(exit timeout)"));
    }

    #[tokio::test]
    async fn runs_in_step_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/marker"), "x").unwrap();
        let mut step = make_step("ls", "test -f marker", 10);
        step.working_dir = Some("sub".into());
        let result = Runner::new().execute(&[step], dir.path()).await;
        assert!(result.passed());
    }

    #[tokio::test]
    async fn no_steps_passes() {
        let dir = tempfile::tempdir().unwrap();
        let result = Runner::new().execute(&[], dir.path()).await;
        assert!(result.passed());
    }

    #[test]
    fn tail_keeps_end_of_long_output() {
        let long = format!("{}END", "x".repeat(MAX_OUTPUT_BYTES + 10));
        let cut = tail(&long);
        assert!(cut.starts_with("..."));
        assert!(cut.ends_with("END"));
        assert_eq!(tail("short"), "short");
    }
}
