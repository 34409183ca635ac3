pub mod profiles;
pub mod runner;
pub mod sandbox;

pub use runner::{RunResult, RunStatus, Runner};
pub use sandbox::{Sandbox, SandboxError};
