use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::CallSummary;

/// Contact status of an organization, driven by the call lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq, Default)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationStatus {
    #[default]
    Ready,
    Calling,
    Scheduled,
    Completed,
}

impl OrganizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationStatus::Ready => "ready",
            OrganizationStatus::Calling => "calling",
            OrganizationStatus::Scheduled => "scheduled",
            OrganizationStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for OrganizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate organization a volunteer might contact
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub status: OrganizationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub scheduled_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub call_notes: Option<CallSummary>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            address: String::new(),
            categories: Vec::new(),
            status: OrganizationStatus::Ready,
            scheduled_time: None,
            phone: None,
            url: None,
            call_notes: None,
        }
    }

    /// Checks that the status-specific fields agree with `status`.
    ///
    /// `scheduled_time` is set only while scheduled, `call_notes` only once completed.
    pub fn is_consistent(&self) -> bool {
        let has_schedule = self
            .scheduled_time
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());

        match self.status {
            OrganizationStatus::Scheduled => has_schedule && self.call_notes.is_none(),
            OrganizationStatus::Completed => self.call_notes.is_some() && self.scheduled_time.is_none(),
            OrganizationStatus::Ready | OrganizationStatus::Calling => {
                self.scheduled_time.is_none() && self.call_notes.is_none()
            }
        }
    }
}
