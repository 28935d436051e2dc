use shared_types::Organization;
use std::time::Duration;
use tokio::sync::watch;

use crate::api_client::CallBackend;
use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryStep {
    pub label: &'static str,
    pub duration: Duration,
}

pub const DISCOVERY_STEPS: [DiscoveryStep; 5] = [
    DiscoveryStep {
        label: "Understanding your mission",
        duration: Duration::from_millis(1500),
    },
    DiscoveryStep {
        label: "Searching for local organizations",
        duration: Duration::from_millis(2500),
    },
    DiscoveryStep {
        label: "Checking community listings",
        duration: Duration::from_millis(2000),
    },
    DiscoveryStep {
        label: "Matching organizations to your mission",
        duration: Duration::from_millis(2000),
    },
    DiscoveryStep {
        label: "Preparing your results",
        duration: Duration::from_millis(1000),
    },
];

const DEFAULT_TICK: Duration = Duration::from_millis(100);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Completed,
    OrganizationsArrived,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub step: usize,
    pub label: &'static str,
    pub percent: u8,
}

/// Cosmetic progress over a fixed list of steps. It only looks at the
/// backend through the `arrived` flag, and only between steps.
#[derive(Debug, Clone)]
pub struct DiscoverySequencer {
    steps: Vec<DiscoveryStep>,
    tick: Duration,
    timeout: Duration,
}

impl Default for DiscoverySequencer {
    fn default() -> Self {
        Self::new(DISCOVERY_STEPS.to_vec())
    }
}

impl DiscoverySequencer {
    pub fn new(steps: Vec<DiscoveryStep>) -> Self {
        Self {
            steps,
            tick: DEFAULT_TICK,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the steps, reporting progress through `on_progress`. Percent never
    /// decreases and the last report is always 100.
    pub async fn run<F>(&self, arrived: watch::Receiver<bool>, mut on_progress: F) -> DiscoveryOutcome
    where
        F: FnMut(Progress),
    {
        let mut last = Progress {
            step: 0,
            label: self.steps.first().map(|s| s.label).unwrap_or(""),
            percent: 0,
        };

        let outcome = {
            let mut report = |progress: Progress| {
                if progress.percent >= last.percent {
                    last = progress;
                    on_progress(progress);
                }
            };
            match tokio::time::timeout(self.timeout, self.run_steps(arrived, &mut report)).await {
                Ok(outcome) => outcome,
                Err(_) => DiscoveryOutcome::TimedOut,
            }
        };

        on_progress(Progress {
            percent: 100,
            ..last
        });
        tracing::debug!("Discovery finished: {:?}", outcome);
        outcome
    }

    async fn run_steps<F>(&self, arrived: watch::Receiver<bool>, report: &mut F) -> DiscoveryOutcome
    where
        F: FnMut(Progress),
    {
        let total: Duration = self.steps.iter().map(|s| s.duration).sum();
        let mut elapsed = Duration::ZERO;

        for (index, step) in self.steps.iter().enumerate() {
            if *arrived.borrow() {
                return DiscoveryOutcome::OrganizationsArrived;
            }

            let mut interval = tokio::time::interval(self.tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await;

            let mut step_elapsed = Duration::ZERO;
            report(progress(index, step.label, elapsed, total));
            while step_elapsed < step.duration {
                interval.tick().await;
                step_elapsed = (step_elapsed + self.tick).min(step.duration);
                report(progress(index, step.label, elapsed + step_elapsed, total));
            }
            elapsed += step.duration;
        }

        DiscoveryOutcome::Completed
    }
}

/// Percent done, held below 100 until the run ends
fn progress(step: usize, label: &'static str, elapsed: Duration, total: Duration) -> Progress {
    let percent = if total.is_zero() {
        0
    } else {
        ((elapsed.as_millis() * 100) / total.as_millis()).min(99) as u8
    };
    Progress {
        step,
        label,
        percent,
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub outcome: DiscoveryOutcome,
    pub refined_mission: Option<String>,
    pub organizations: Vec<Organization>,
}

/// Refines the mission and searches for organizations while the sequencer
/// runs. A failed refinement is logged and left out; a failed search is an error.
pub async fn discover<F>(
    backend: &dyn CallBackend,
    location: &str,
    mission: &str,
    sequencer: &DiscoverySequencer,
    on_progress: F,
) -> Result<DiscoveryReport, ClientError>
where
    F: FnMut(Progress),
{
    let (arrived_tx, arrived_rx) = watch::channel(false);

    // Arrival is signalled by the search alone so a slow refinement cannot hold the sequencer
    let search = async {
        let organizations = backend.search_organizations(mission, location).await;
        if organizations.is_ok() {
            let _ = arrived_tx.send(true);
        }
        organizations
    };
    let work = async { tokio::join!(backend.refine_mission(mission, location), search) };

    let ((refined, organizations), outcome) =
        tokio::join!(work, sequencer.run(arrived_rx, on_progress));

    let refined_mission = match refined {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!("Mission refinement failed: {}", e);
            None
        }
    };

    Ok(DiscoveryReport {
        outcome,
        refined_mission,
        organizations: organizations?,
    })
}
