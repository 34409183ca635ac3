/// Append Doc instructions. The response is split on `---` lines.
pub fn append_instructions(prompt: &mut String) {
    prompt.push_str("## Instructions\n\n");
    prompt.push_str(
        "You are a technical writer. Using the accepted changes above, write \
         three sections, separated by lines containing only `---`:\n\n\
         1. A README update summarising the changes for users.\n\
         2. A Markdown changelog entry (a bullet list).\n\
         3. A concise commit message: a summary line under 72 characters, \
            optionally followed by a blank line and body.\n\n\
         Do not add headings for the sections and do not repeat yourself.\n",
    );
}
