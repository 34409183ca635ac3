use jum_core::{AgentError, CodeArtifact};
use jum_verify::sandbox::is_safe_relative;

/// Extract a code artifact from a Dev agent response.
///
/// Expects blocks in this format:
/// ```markdown
/// ### FILE: <relative/path>
/// ~~~python
/// <file contents>
/// ~~~
/// ### RATIONALE
/// <free text>
/// ```
/// Fences may use backticks or tildes of any length >= 3; a block closes on a
/// line made only of the same fence character, at least as long as the opener.
/// Text outside blocks is ignored. A later block for the same path replaces
/// the earlier one.
pub fn parse_artifact(response: &str) -> Result<CodeArtifact, AgentError> {
    let mut artifact = CodeArtifact::default();
    let mut pending_path: Option<String> = None;
    let mut open_fence: Option<String> = None;
    let mut body = String::new();
    let mut rationale = String::new();
    let mut in_rationale = false;

    for line in response.lines() {
        let trimmed = line.trim();

        // Inside a code block everything is content until the closing fence
        if let Some(ref fence) = open_fence {
            if closes_fence(trimmed, fence) {
                if let Some(path) = pending_path.take() {
                    artifact.files.insert(path, std::mem::take(&mut body));
                }
                open_fence = None;
            } else {
                body.push_str(line);
                body.push('\n');
            }
            continue;
        }

        if let Some(path) = file_heading(trimmed) {
            if let Some(prev) = pending_path.take() {
                return Err(missing_block(&prev));
            }
            let path = clean_path(path);
            if !is_safe_relative(&path) {
                return Err(AgentError::Generation(format!(
                    "unsafe file path in response: {path:?}"
                )));
            }
            pending_path = Some(path);
            in_rationale = false;
            continue;
        }

        if let Some(after) = rationale_heading(trimmed) {
            if let Some(prev) = pending_path.take() {
                return Err(missing_block(&prev));
            }
            in_rationale = true;
            if !after.is_empty() {
                rationale.push_str(after);
                rationale.push('\n');
            }
            continue;
        }

        if pending_path.is_some() {
            if let Some(fence) = opening_fence(trimmed) {
                open_fence = Some(fence);
                body.clear();
            }
            // Prose between the heading and its block is skipped
            continue;
        }

        if in_rationale {
            rationale.push_str(line);
            rationale.push('\n');
        }
    }

    if let Some(path) = pending_path {
        return Err(match open_fence {
            Some(_) => AgentError::Generation(format!("unterminated code block for {path}")),
            None => missing_block(&path),
        });
    }

    if artifact.is_empty() {
        return Err(AgentError::Generation(
            "response contained no `### FILE:` blocks".into(),
        ));
    }

    artifact.rationale = rationale.trim().to_string();
    Ok(artifact)
}

fn missing_block(path: &str) -> AgentError {
    AgentError::Generation(format!("file block for {path} has no code fence"))
}

/// Match `### FILE: path`, `## File: path`, or a bare `FILE: path`.
fn file_heading(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('#').trim_start();
    let rest = rest.strip_prefix("**").unwrap_or(rest);
    let label = rest.get(..5)?;
    if !label.eq_ignore_ascii_case("file:") {
        return None;
    }
    Some(rest[5..].trim())
}

/// Match `### RATIONALE` or `RATIONALE: text`, returning any inline text.
fn rationale_heading(line: &str) -> Option<&str> {
    let heading = line.starts_with('#');
    let rest = line.trim_start_matches('#').trim_start();
    let rest = rest.strip_prefix("**").unwrap_or(rest);
    let label = rest.get(..9)?;
    if !label.eq_ignore_ascii_case("rationale") {
        return None;
    }
    let after = rest[9..].trim_start_matches("**");
    match after.strip_prefix(':') {
        Some(text) => Some(text.trim_start_matches("**").trim()),
        None if heading && after.trim().is_empty() => Some(""),
        None => None,
    }
}

fn clean_path(raw: &str) -> String {
    raw.trim()
        .trim_matches('*')
        .trim()
        .trim_matches('`')
        .trim()
        .to_string()
}

fn opening_fence(line: &str) -> Option<String> {
    let marker = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    Some(std::iter::repeat(marker).take(len).collect())
}

fn closes_fence(line: &str, fence: &str) -> bool {
    let Some(marker) = fence.chars().next() else {
        return false;
    };
    !line.is_empty() && line.chars().all(|c| c == marker) && line.len() >= fence.len()
}
