//! MissionMatch client
//!
//! Talks to the MissionMatch backend, walks the user through the
//! location -> mission -> discovery -> results wizard and tracks the call
//! state of every organization found.

pub mod api_client;
pub mod discovery;
mod error;
pub mod lifecycle;
pub mod location;
pub mod render;
pub mod store;
pub mod wizard;

pub use api_client::{CallBackend, HttpBackend, DEFAULT_API_URL};
pub use discovery::{DiscoveryOutcome, DiscoverySequencer, Progress};
pub use error::{ClientError, LifecycleError};
pub use lifecycle::{CallLifecycle, PollConfig};
pub use store::{OrganizationStore, Transition};
pub use wizard::{Wizard, WizardStep};
