/// Append Manager instructions to the prompt.
pub fn append_instructions(prompt: &mut String) {
    prompt.push_str("## Instructions\n\n");
    prompt.push_str(
        "You are a project manager for a software team. Break the objective above \
         into an ordered sequence of small, independently reviewable sub-tasks.\n\n\
         Follow these rules:\n\
         - Return ONLY a numbered list, one sub-task per line, in execution order.\n\
         - Prefix each item with the agent that should handle it: \
           `DEV:` for writing or changing code, `QA:` for writing tests, \
           `DOC:` for documentation.\n\
         - Keep each description to one sentence that states the acceptance criteria.\n\
         - Do not include explanations before or after the list.\n\n\
         Example:\n\
         1. DEV: Create `wc.py` that prints the word count of a file given as argument\n\
         2. QA: Add `test_wc.py` covering empty files and multiple spaces\n\
         3. DOC: Describe usage in the README\n",
    );
}
