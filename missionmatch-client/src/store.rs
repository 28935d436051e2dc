use shared_types::{CallSummary, Organization, OrganizationStatus};
use std::collections::HashMap;

use crate::LifecycleError;

/// A requested change to one organization's call state
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// `ready -> calling`
    StartCall,
    /// `calling -> ready`, on initiation failure, timeout or cancel
    CallFailed,
    /// `calling -> completed`
    CallCompleted(CallSummary),
    /// `ready -> scheduled`
    Schedule(String),
    /// `scheduled -> ready`
    CancelSchedule,
}

impl Transition {
    fn action(&self) -> &'static str {
        match self {
            Transition::StartCall => "start a call for",
            Transition::CallFailed => "reset the call for",
            Transition::CallCompleted(_) => "complete the call for",
            Transition::Schedule(_) => "schedule",
            Transition::CancelSchedule => "cancel the schedule for",
        }
    }
}

/// Organizations keyed by id, in the order they arrived.
///
/// `apply` is the only mutation path for call state, so the status /
/// `scheduledTime` / `callNotes` invariant holds for every stored organization.
#[derive(Debug, Default, Clone)]
pub struct OrganizationStore {
    order: Vec<String>,
    by_id: HashMap<String, Organization>,
}

impl OrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with fresh search results. Duplicate ids keep
    /// the first entry; every organization starts `ready`.
    pub fn replace_all(&mut self, organizations: Vec<Organization>) {
        self.order.clear();
        self.by_id.clear();
        for mut organization in organizations {
            if self.by_id.contains_key(&organization.id) {
                continue;
            }
            organization.status = OrganizationStatus::Ready;
            organization.scheduled_time = None;
            organization.call_notes = None;
            self.order.push(organization.id.clone());
            self.by_id.insert(organization.id.clone(), organization);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Organization> {
        self.by_id.get(id)
    }

    pub fn list(&self) -> Vec<Organization> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Validates and applies `transition`, returning the updated organization
    pub fn apply(
        &mut self,
        id: &str,
        transition: Transition,
    ) -> Result<Organization, LifecycleError> {
        let organization = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| LifecycleError::UnknownOrganization(id.to_string()))?;

        use OrganizationStatus::*;
        let invalid = |status| LifecycleError::InvalidTransition {
            id: id.to_string(),
            status,
            action: transition.action(),
        };

        match (&transition, organization.status) {
            (Transition::StartCall, Ready) => {
                organization.status = Calling;
            }
            (Transition::CallFailed, Calling) => {
                organization.status = Ready;
            }
            (Transition::CallCompleted(summary), Calling) => {
                organization.status = Completed;
                organization.call_notes = Some(summary.clone());
            }
            (Transition::Schedule(time), Ready) => {
                if time.trim().is_empty() {
                    return Err(LifecycleError::EmptySchedule);
                }
                organization.status = Scheduled;
                organization.scheduled_time = Some(time.trim().to_string());
            }
            (Transition::CancelSchedule, Scheduled) => {
                organization.status = Ready;
                organization.scheduled_time = None;
            }
            (_, status) => return Err(invalid(status)),
        }

        tracing::debug!("{} is now {}", id, organization.status);
        Ok(organization.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> OrganizationStore {
        let mut store = OrganizationStore::new();
        store.replace_all(vec![
            Organization::new("b", "Tool Library"),
            Organization::new("a", "Food Bank"),
            Organization::new("b", "Tool Library (dup)"),
        ]);
        store
    }

    #[test]
    fn test_keeps_arrival_order_and_first_duplicate() {
        let store = store();
        let names: Vec<String> = store.list().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["Tool Library", "Food Bank"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_call_lifecycle() {
        let mut store = store();
        store.apply("a", Transition::StartCall).unwrap();

        let summary = CallSummary {
            summary: "Happy to have help.".to_string(),
            ..Default::default()
        };
        let done = store.apply("a", Transition::CallCompleted(summary.clone())).unwrap();

        assert_eq!(done.status, OrganizationStatus::Completed);
        assert_eq!(done.call_notes, Some(summary));
        assert!(done.is_consistent());
    }

    #[test]
    fn test_double_deploy_rejected() {
        let mut store = store();
        store.apply("a", Transition::StartCall).unwrap();

        let err = store.apply("a", Transition::StartCall).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                id: "a".to_string(),
                status: OrganizationStatus::Calling,
                action: "start a call for",
            }
        );
        assert_eq!(store.get("a").unwrap().status, OrganizationStatus::Calling);
    }

    #[test]
    fn test_schedule_and_cancel() {
        let mut store = store();

        assert_eq!(
            store.apply("b", Transition::Schedule("  ".to_string())),
            Err(LifecycleError::EmptySchedule)
        );
        assert_eq!(store.get("b").unwrap().status, OrganizationStatus::Ready);

        let scheduled = store
            .apply("b", Transition::Schedule("2026-10-20 14:30".to_string()))
            .unwrap();
        assert_eq!(scheduled.status, OrganizationStatus::Scheduled);
        assert_eq!(scheduled.scheduled_time.as_deref(), Some("2026-10-20 14:30"));
        assert!(scheduled.is_consistent());

        // A scheduled organization cannot be called until the schedule is cancelled
        assert!(store.apply("b", Transition::StartCall).is_err());

        let ready = store.apply("b", Transition::CancelSchedule).unwrap();
        assert_eq!(ready.status, OrganizationStatus::Ready);
        assert_eq!(ready.scheduled_time, None);
        assert!(ready.is_consistent());
    }

    #[test]
    fn test_unknown_organization() {
        let mut store = store();
        assert_eq!(
            store.apply("zzz", Transition::StartCall),
            Err(LifecycleError::UnknownOrganization("zzz".to_string()))
        );
    }

    #[test]
    fn test_replace_all_resets_state() {
        let mut store = store();
        store.apply("a", Transition::StartCall).unwrap();

        store.replace_all(vec![Organization {
            status: OrganizationStatus::Completed,
            ..Organization::new("a", "Food Bank")
        }]);

        let org = store.get("a").unwrap();
        assert_eq!(org.status, OrganizationStatus::Ready);
        assert!(org.is_consistent());
    }
}
