pub mod executor;

pub use executor::{MissionToolExecutor, WebSearchParams};
