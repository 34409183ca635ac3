pub mod build;
pub mod context;
pub mod doc;
pub mod plan;
pub mod verify;

pub use context::PromptContext;
use jum_core::AgentRole;

/// The system message sent alongside every prompt for `role`.
pub fn system_prompt(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Manager => {
            "You are the engineering manager of a small team. You break objectives \
             into small, concrete, ordered tasks and assign each one to a developer, \
             a tester, or a technical writer."
        }
        AgentRole::Dev => {
            "You are a senior software developer. You write complete, working files \
             and nothing else. You never leave placeholders."
        }
        AgentRole::Qa => {
            "You are a meticulous code reviewer. You judge whether code fully and \
             correctly accomplishes its task, and you always end with a verdict."
        }
        AgentRole::Doc => {
            "You are a technical writer. You document accepted changes accurately \
             and concisely, without inventing features."
        }
    }
}

/// Assemble the full prompt for a given role and context.
pub fn assemble_prompt(ctx: &PromptContext, role: AgentRole) -> String {
    let mut prompt = String::new();
    ctx.append_preamble(&mut prompt);

    match role {
        AgentRole::Manager => plan::append_instructions(&mut prompt),
        AgentRole::Dev => build::append_instructions(
            &mut prompt,
            ctx.artifact.as_ref(),
            ctx.feedback.as_deref(),
        ),
        AgentRole::Qa => verify::append_instructions(&mut prompt, ctx.artifact.as_ref()),
        AgentRole::Doc => {
            ctx.append_changelog(&mut prompt);
            doc::append_instructions(&mut prompt);
        }
    }

    prompt
}
