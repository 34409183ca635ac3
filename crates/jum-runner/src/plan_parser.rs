use jum_core::{AgentError, PlannedTask, TaskKind};

/// Extract the Manager's plan from its response.
///
/// Each plan item is one list line, numbered (`1.`, `2)`) or bulleted
/// (`-`, `*`), optionally starting with a role label:
/// ```text
/// 1. DEV: Create the argument parser
/// 2. QA: Add tests for empty input
/// - DOC: Document the --help output
/// ```
/// Labels are case-insensitive and may be bracketed or bold. Items without a
/// label are development work. Everything else in the response is ignored.
pub fn parse_plan(response: &str) -> Result<Vec<PlannedTask>, AgentError> {
    let mut items = Vec::new();
    let mut in_code_block = false;

    for line in response.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }

        let Some(body) = strip_list_marker(trimmed) else {
            continue;
        };
        let body = body.replace("**", "");
        let (kind, description) = split_label(body.trim());
        let description = description.trim();
        if description.is_empty() {
            continue;
        }
        items.push(PlannedTask::new(description, kind));
    }

    if items.is_empty() {
        return Err(AgentError::Planning(
            "manager response contained no plan items".into(),
        ));
    }
    Ok(items)
}

/// Strip `1.`, `12)`, `-` or `*` from the start of a list line.
fn strip_list_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest);
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    // "1.5 GB" is not a list item
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest)
}

fn split_label(body: &str) -> (TaskKind, &str) {
    let unbracketed = body.strip_prefix('[').unwrap_or(body);
    for (label, kind) in [
        ("docs", TaskKind::Doc),
        ("doc", TaskKind::Doc),
        ("dev", TaskKind::Dev),
        ("qa", TaskKind::Qa),
    ] {
        let Some(head) = unbracketed.get(..label.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(label) {
            continue;
        }
        let rest = &unbracketed[label.len()..];
        // "Develop ..." or "Documentation ..." are descriptions, not labels
        match rest.chars().next() {
            Some(c) if c == ':' || c == ']' || c == '-' || c.is_whitespace() => {}
            _ => continue,
        }
        let rest = rest.trim_start_matches(|c: char| {
            c == ':' || c == ']' || c == '-' || c.is_whitespace()
        });
        return (kind, rest);
    }
    (TaskKind::Dev, body)
}
