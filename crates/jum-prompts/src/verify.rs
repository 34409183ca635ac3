use jum_core::CodeArtifact;

use crate::context::append_artifact;

/// Append QA review instructions, with the artifact under review.
pub fn append_instructions(prompt: &mut String, artifact: Option<&CodeArtifact>) {
    prompt.push_str("## Artifact Under Review\n\n");
    match artifact {
        Some(a) if !a.is_empty() => append_artifact(prompt, a),
        _ => prompt.push_str("(no files)\n\n"),
    }

    prompt.push_str("## Instructions\n\n");
    prompt.push_str(
        "You are a strict QA engineer. Review the artifact above against the \
         sub-task description, which is the acceptance criteria.\n\n\
         Check for:\n\
         - **Completeness**: every requirement of the sub-task is implemented.\n\
         - **Correctness**: the code would run and behave as described.\n\
         - **Errors**: syntax errors, missing imports, unhandled edge cases.\n\n\
         Write your findings as a short list. Then finish with exactly one line, \
         either `VERDICT: PASS` or `VERDICT: FAIL`.\n",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_instructions_content() {
        let artifact = CodeArtifact::default().with_file("x.py", "pass");
        let mut out = String::new();
        append_instructions(&mut out, Some(&artifact));
        assert!(out.contains("## Instructions"));
        assert!(out.contains("### FILE: x.py"));
        assert!(out.contains("VERDICT: PASS"));
        assert!(out.contains("VERDICT: FAIL"));
    }

    #[test]
    fn empty_artifact_is_called_out() {
        let mut out = String::new();
        append_instructions(&mut out, None);
        assert!(out.contains("(no files)"));
    }
}
