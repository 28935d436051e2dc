pub mod llm;
pub mod mission_refiner;
pub mod tools;

pub use llm::{ClaudeClient, LlmClient, LlmError};
pub use mission_refiner::MissionRefinerAgent;
pub use tools::MissionToolExecutor;
