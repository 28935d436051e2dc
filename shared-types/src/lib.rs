use serde::{Deserialize, Serialize};

pub mod api;
pub mod call_summary;
pub mod note;
pub mod organization;
pub mod phone;
pub mod settings;

pub use api::{
    CallStatusResponse, CallSummaryResponse, NotesResponse, OrganizationSearchRequest,
    OrganizationSearchResponse, RefineRequest, RefineResponse, VoiceCallRequest,
    VoiceCallResponse,
};
pub use call_summary::{summary_key, CallRecord, CallSummary};
pub use note::{NoteStatus, OrgNote};
pub use organization::{Organization, OrganizationStatus};
pub use phone::{format_phone_display, normalize_e164, PhoneError};
pub use settings::{ProviderStatus, SettingsResponse};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
