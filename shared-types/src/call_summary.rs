use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Structured outcome of a completed outbound call
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CallSummary {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub interested: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub next_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub callback_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "unknown")]
    pub vapi_analysis: Option<serde_json::Value>,
}

/// Stored row behind a call summary.
///
/// Keyed by phone number when one is known, otherwise by call id. A record
/// without a summary belongs to a call that has not reported an outcome yet.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub key: String,
    pub call_id: Option<String>,
    pub phone: Option<String>,
    pub organization_name: Option<String>,
    pub summary: Option<CallSummary>,
    pub updated_at: i64,
}

/// Picks the storage key for a call: phone first, call id as fallback
pub fn summary_key<'a>(phone: Option<&'a str>, call_id: Option<&'a str>) -> Option<&'a str> {
    phone
        .filter(|p| !p.trim().is_empty())
        .or_else(|| call_id.filter(|c| !c.trim().is_empty()))
}
