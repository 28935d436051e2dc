use shared_types::OrganizationStatus;
use thiserror::Error;

use crate::wizard::WizardStep;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },

    #[error("{0} is required")]
    MissingInput(&'static str),

    #[error("Wizard is at the {actual:?} step, expected {expected:?}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Rejected call-lifecycle transitions
#[derive(Debug, Error, PartialEq)]
pub enum LifecycleError {
    #[error("Unknown organization {0}")]
    UnknownOrganization(String),

    #[error("Cannot {action} {id} while it is {status}")]
    InvalidTransition {
        id: String,
        status: OrganizationStatus,
        action: &'static str,
    },

    #[error("Scheduled date and time are required")]
    EmptySchedule,

    #[error("Organization {0} has no phone number")]
    MissingPhone(String),
}
