pub mod agents;
pub mod artifact_parser;
pub mod commit;
pub mod config;
pub mod event_log;
pub mod orchestrator;
pub mod plan_parser;
pub mod preflight;
pub mod report;

pub use orchestrator::Orchestrator;
pub use report::RunReport;
