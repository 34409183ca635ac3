use jum_core::verification::{ProfileTemplate, StepTemplate};

fn step(name: &str, command: &str, timeout_s: u64) -> StepTemplate {
    StepTemplate {
        name: name.into(),
        command: command.into(),
        working_dir: None,
        timeout_s,
    }
}

pub fn builtin_profiles() -> Vec<ProfileTemplate> {
    vec![
        ProfileTemplate {
            name: "python".into(),
            description: "Python: byte-compile every module, run pytest when tests exist".into(),
            steps: vec![
                step("Compile", "python3 -m compileall -q .", 60),
                step(
                    "Test",
                    "if [ -n \"$(find . -name 'test_*.py' -print -quit)\" ]; then python3 -m pytest -q; fi",
                    300,
                ),
            ],
        },
        ProfileTemplate {
            name: "rust".into(),
            description: "Rust: check and test the crate".into(),
            steps: vec![
                step("Check", "cargo check --all-targets", 300),
                step("Test", "cargo test", 600),
            ],
        },
        ProfileTemplate {
            name: "node".into(),
            description: "Node: syntax-check scripts, run npm test when defined".into(),
            steps: vec![
                step(
                    "Syntax",
                    "for f in $(find . -name '*.js' -not -path './node_modules/*'); do node --check \"$f\" || exit 1; done",
                    60,
                ),
                step(
                    "Test",
                    "if [ -f package.json ]; then npm test --if-present; fi",
                    300,
                ),
            ],
        },
    ]
}

/// Look up a builtin profile by name, ignoring case.
pub fn find_profile(name: &str) -> Option<ProfileTemplate> {
    let wanted = name.trim().to_lowercase();
    builtin_profiles().into_iter().find(|p| p.name == wanted)
}
