use shared_types::Organization;

use crate::api_client::CallBackend;
use crate::discovery::{discover, DiscoveryOutcome, DiscoveryReport, DiscoverySequencer, Progress};
use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Location,
    Mission,
    Discovery,
    Results,
}

/// Location -> Mission -> Discovery -> Results, carrying what each screen collected
#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    location: String,
    mission: String,
    refined_mission: Option<String>,
    organizations: Vec<Organization>,
    outcome: Option<DiscoveryOutcome>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Location,
            location: String::new(),
            mission: String::new(),
            refined_mission: None,
            organizations: Vec::new(),
            outcome: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    pub fn refined_mission(&self) -> Option<&str> {
        self.refined_mission.as_deref()
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn outcome(&self) -> Option<DiscoveryOutcome> {
        self.outcome
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), ClientError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ClientError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// The location may be empty when detection failed and the user skipped it
    pub fn submit_location(&mut self, location: impl Into<String>) -> Result<(), ClientError> {
        self.expect_step(WizardStep::Location)?;
        self.location = location.into().trim().to_string();
        self.step = WizardStep::Mission;
        Ok(())
    }

    pub fn submit_mission(&mut self, mission: impl Into<String>) -> Result<(), ClientError> {
        self.expect_step(WizardStep::Mission)?;
        let mission = mission.into().trim().to_string();
        if mission.is_empty() {
            return Err(ClientError::MissingInput("mission"));
        }
        self.mission = mission;
        self.step = WizardStep::Discovery;
        Ok(())
    }

    pub fn complete_discovery(&mut self, report: DiscoveryReport) -> Result<(), ClientError> {
        self.expect_step(WizardStep::Discovery)?;
        self.outcome = Some(report.outcome);
        self.refined_mission = report.refined_mission;
        self.organizations = report.organizations;
        self.step = WizardStep::Results;
        Ok(())
    }

    /// Goes back one screen. Discovery cannot be left while it runs.
    pub fn back(&mut self) {
        self.step = match self.step {
            WizardStep::Location | WizardStep::Mission => WizardStep::Location,
            WizardStep::Discovery => WizardStep::Discovery,
            WizardStep::Results => {
                self.organizations.clear();
                self.refined_mission = None;
                self.outcome = None;
                WizardStep::Mission
            }
        };
    }

    /// Runs the discovery screen against the backend and moves to results
    pub async fn run_discovery<F>(
        &mut self,
        backend: &dyn CallBackend,
        sequencer: &DiscoverySequencer,
        on_progress: F,
    ) -> Result<&[Organization], ClientError>
    where
        F: FnMut(Progress),
    {
        self.expect_step(WizardStep::Discovery)?;
        let report = discover(backend, &self.location, &self.mission, sequencer, on_progress).await?;
        tracing::info!(
            "Discovery {:?} with {} organizations",
            report.outcome,
            report.organizations.len()
        );
        self.complete_discovery(report)?;
        Ok(&self.organizations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_types::{CallStatusResponse, CallSummary, OrgNote, VoiceCallRequest};
    use std::time::Duration;

    struct SearchOnly {
        fail_refine: bool,
    }

    #[async_trait]
    impl CallBackend for SearchOnly {
        async fn refine_mission(&self, mission: &str, location: &str) -> Result<String, ClientError> {
            if self.fail_refine {
                return Err(ClientError::Status {
                    path: "/api/agents/refine".to_string(),
                    status: 500,
                    message: "Failed to refine mission".to_string(),
                });
            }
            Ok(format!("Refined: {mission} in {location}"))
        }

        async fn search_organizations(&self, _: &str, _: &str) -> Result<Vec<Organization>, ClientError> {
            Ok(vec![Organization::new("1", "Food Bank")])
        }

        async fn start_call(&self, _: &VoiceCallRequest) -> Result<String, ClientError> {
            unreachable!()
        }

        async fn call_status(&self, _: &str) -> Result<CallStatusResponse, ClientError> {
            unreachable!()
        }

        async fn call_summary(&self, _: &str) -> Result<Option<CallSummary>, ClientError> {
            unreachable!()
        }

        async fn notes(&self) -> Result<Vec<OrgNote>, ClientError> {
            unreachable!()
        }
    }

    fn sequencer() -> DiscoverySequencer {
        DiscoverySequencer::new(vec![
            crate::discovery::DiscoveryStep {
                label: "one",
                duration: Duration::from_millis(10),
            },
            crate::discovery::DiscoveryStep {
                label: "two",
                duration: Duration::from_millis(10),
            },
        ])
        .with_tick(Duration::from_millis(2))
    }

    #[test]
    fn test_steps_in_order() {
        let mut wizard = Wizard::new();
        assert!(matches!(
            wizard.submit_mission("help"),
            Err(ClientError::WrongStep {
                expected: WizardStep::Mission,
                actual: WizardStep::Location
            })
        ));

        wizard.submit_location("  Oakland, CA ").unwrap();
        assert_eq!(wizard.location(), "Oakland, CA");
        assert_eq!(wizard.step(), WizardStep::Mission);

        assert!(matches!(
            wizard.submit_mission("   "),
            Err(ClientError::MissingInput("mission"))
        ));
        assert_eq!(wizard.step(), WizardStep::Mission);

        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Location);
    }

    #[tokio::test]
    async fn test_discovery_reaches_results() {
        let mut wizard = Wizard::new();
        wizard.submit_location("Oakland").unwrap();
        wizard.submit_mission("feed people").unwrap();

        let mut last_percent = 0;
        let organizations = wizard
            .run_discovery(&SearchOnly { fail_refine: false }, &sequencer(), |p| {
                last_percent = p.percent
            })
            .await
            .unwrap();
        assert_eq!(organizations.len(), 1);
        assert_eq!(last_percent, 100);

        assert_eq!(wizard.step(), WizardStep::Results);
        assert_eq!(wizard.refined_mission(), Some("Refined: feed people in Oakland"));
        assert!(wizard.outcome().is_some());

        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Mission);
        assert!(wizard.organizations().is_empty());
    }

    #[tokio::test]
    async fn test_refine_failure_still_shows_results() {
        let mut wizard = Wizard::new();
        wizard.submit_location("").unwrap();
        wizard.submit_mission("plant trees").unwrap();

        wizard
            .run_discovery(&SearchOnly { fail_refine: true }, &sequencer(), |_| {})
            .await
            .unwrap();

        assert_eq!(wizard.step(), WizardStep::Results);
        assert!(wizard.refined_mission().is_none());
        assert_eq!(wizard.organizations().len(), 1);
    }
}
