use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{CallSummary, OrgNote, Organization};

/// Body of `POST /api/agents/refine`
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
pub struct RefineRequest {
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub ok: bool,
    pub received: RefineRequest,
    pub agent_response: String,
}

/// Body of `POST /api/organizations/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrganizationSearchRequest {
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrganizationSearchResponse {
    pub ok: bool,
    pub organizations: Vec<Organization>,
}

/// Body of `POST /api/voice/call`
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCallRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCallResponse {
    pub ok: bool,
    pub call_id: String,
}

/// Response of `GET /api/voice/call/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CallStatusResponse {
    pub ok: bool,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub summary: Option<CallSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CallSummaryResponse {
    pub ok: bool,
    pub data: Option<CallSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NotesResponse {
    pub ok: bool,
    pub notes: Vec<OrgNote>,
}
