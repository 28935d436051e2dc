use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{CallRecord, CallSummary};

/// Dashboard status of an organization once its call outcome is known
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    Onboarded,
    Unsure,
    Declined,
    Callback,
    Pending,
    Interested,
    NotAvailable,
}

const UNAVAILABLE_MARKERS: [&str; 3] = ["not available", "unavailable", "no availability"];

impl NoteStatus {
    /// Projects a call outcome into a dashboard status. First match wins.
    pub fn from_summary(summary: Option<&CallSummary>) -> Self {
        let Some(summary) = summary else {
            return NoteStatus::Pending;
        };

        let mentions_onboarding = summary.summary.to_lowercase().contains("onboard")
            || summary
                .next_steps
                .iter()
                .flatten()
                .any(|step| step.to_lowercase().contains("onboard"));
        if mentions_onboarding {
            return NoteStatus::Onboarded;
        }

        if summary
            .callback_date
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
        {
            return NoteStatus::Callback;
        }

        if let Some(availability) = summary.availability.as_deref() {
            let availability = availability.to_lowercase();
            if UNAVAILABLE_MARKERS.iter().any(|m| availability.contains(m)) {
                return NoteStatus::NotAvailable;
            }
        }

        match summary.interested {
            Some(true) => NoteStatus::Interested,
            Some(false) => NoteStatus::Declined,
            None => NoteStatus::Unsure,
        }
    }
}

/// Read-only projection of a stored call record for the notes dashboard
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrgNote {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub status: NoteStatus,
    pub summary: Option<String>,
    pub contact_name: Option<String>,
    pub callback_date: Option<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    pub updated_at: i64,
}

impl From<&CallRecord> for OrgNote {
    fn from(record: &CallRecord) -> Self {
        let summary = record.summary.as_ref();
        Self {
            id: record.key.clone(),
            name: record
                .organization_name
                .clone()
                .unwrap_or_else(|| record.key.clone()),
            phone: record.phone.clone(),
            status: NoteStatus::from_summary(summary),
            summary: summary.map(|s| s.summary.clone()),
            contact_name: summary.and_then(|s| s.contact_name.clone()),
            callback_date: summary.and_then(|s| s.callback_date.clone()),
            next_steps: summary
                .and_then(|s| s.next_steps.clone())
                .unwrap_or_default(),
            updated_at: record.updated_at,
        }
    }
}
