use jum_core::CodeArtifact;

use crate::context::append_artifact;

/// Append Dev instructions to the prompt. On a retry, the rejected artifact
/// and the QA feedback are included so the next attempt can address them.
pub fn append_instructions(
    prompt: &mut String,
    previous: Option<&CodeArtifact>,
    feedback: Option<&str>,
) {
    if let Some(feedback) = feedback {
        if let Some(previous) = previous {
            prompt.push_str("## Previous Attempt\n\n");
            append_artifact(prompt, previous);
        }
        prompt.push_str("## QA Feedback\n\n");
        prompt.push_str(feedback.trim());
        prompt.push_str("\n\nThe previous attempt was rejected. Address every point above.\n\n");
    }

    prompt.push_str("## Instructions\n\n");
    prompt.push_str(
        "You are an expert software engineer. Implement the sub-task above.\n\n\
         Follow these guidelines:\n\
         - Only change what the sub-task requires.\n\
         - Write complete file contents, never diffs or placeholders.\n\
         - Use only the standard library unless the sub-task says otherwise.\n\n\
         Output format (required):\n\
         For every file you create or modify, write a heading line \
         `### FILE: <relative/path>` followed by a fenced code block with the \
         full file content. Paths are relative to the repository root and must \
         not contain `..`. After the files, write a `### RATIONALE` heading \
         followed by one short paragraph explaining the change.\n",
    );
}
