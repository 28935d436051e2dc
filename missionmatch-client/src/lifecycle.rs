use shared_types::{normalize_e164, CallSummary, Organization, OrganizationStatus, VoiceCallRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api_client::CallBackend;
use crate::store::{OrganizationStore, Transition};
use crate::{ClientError, LifecycleError};

/// How often and how long a placed call is polled for completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 120,
        }
    }
}

/// Opening line spoken by the voice assistant
pub fn call_message(organization_name: &str, mission: &str) -> String {
    let mission = mission.trim();
    if mission.is_empty() {
        format!(
            "Hi! I'm calling on behalf of a local volunteer through MissionMatch. \
             They'd love to help out at {organization_name}. \
             Do you have any volunteer opportunities right now?"
        )
    } else {
        format!(
            "Hi! I'm calling on behalf of a local volunteer through MissionMatch. \
             They'd love to help out at {organization_name} with this mission: {mission}. \
             Do you have any volunteer opportunities that fit?"
        )
    }
}

/// A running poll. `finished` is cancelled when the task ends, whether it
/// completed or was aborted.
struct PollEntry {
    generation: u64,
    handle: JoinHandle<()>,
    finished: CancellationToken,
}

type PollMap = HashMap<String, PollEntry>;

/// Drives each organization's call state and owns the polling tasks.
///
/// Dropping the lifecycle aborts every in-flight poll and returns those
/// organizations to `ready`.
pub struct CallLifecycle {
    backend: Arc<dyn CallBackend>,
    store: Arc<Mutex<OrganizationStore>>,
    polls: Arc<std::sync::Mutex<PollMap>>,
    generation: AtomicU64,
    poll_config: PollConfig,
    mission: String,
}

impl CallLifecycle {
    pub fn new(backend: Arc<dyn CallBackend>, store: Arc<Mutex<OrganizationStore>>) -> Self {
        Self {
            backend,
            store,
            polls: Arc::new(std::sync::Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            poll_config: PollConfig::default(),
            mission: String::new(),
        }
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = mission.into();
        self
    }

    pub fn store(&self) -> Arc<Mutex<OrganizationStore>> {
        self.store.clone()
    }

    pub async fn organization(&self, id: &str) -> Option<Organization> {
        self.store.lock().await.get(id).cloned()
    }

    pub fn is_polling(&self, id: &str) -> bool {
        self.polls
            .lock()
            .map(|polls| polls.get(id).is_some_and(|entry| !entry.handle.is_finished()))
            .unwrap_or(false)
    }

    /// Places a call to the organization and starts polling it.
    ///
    /// Rejected unless the organization is `ready`. If the backend refuses
    /// the call the organization goes straight back to `ready`.
    pub async fn deploy_call(&self, id: &str) -> Result<String, ClientError> {
        let organization = {
            let mut store = self.store.lock().await;
            let phone = store
                .get(id)
                .ok_or_else(|| LifecycleError::UnknownOrganization(id.to_string()))?
                .phone
                .clone()
                .filter(|p| !p.trim().is_empty());
            if phone.is_none() {
                return Err(LifecycleError::MissingPhone(id.to_string()).into());
            }
            store.apply(id, Transition::StartCall)?
        };
        // Stored summaries are keyed by the E.164 form the server normalizes to
        let phone = organization.phone.clone().unwrap_or_default();
        let phone = normalize_e164(&phone).unwrap_or(phone);

        let request = VoiceCallRequest {
            to: Some(phone.clone()),
            text: Some(call_message(&organization.name, &self.mission)),
            organization_name: Some(organization.name.clone()),
        };

        let call_id = match self.backend.start_call(&request).await {
            Ok(call_id) => call_id,
            Err(e) => {
                tracing::error!("Failed to start call to {}: {}", organization.name, e);
                self.reset(id).await;
                return Err(e);
            }
        };

        tracing::info!("Call {} placed to {}", call_id, organization.name);
        self.spawn_poll(id, call_id.clone(), phone);
        Ok(call_id)
    }

    fn spawn_poll(&self, id: &str, call_id: String, phone: String) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let backend = self.backend.clone();
        let store = self.store.clone();
        let polls = self.polls.clone();
        let poll_config = self.poll_config;
        let org_id = id.to_string();
        let finished = CancellationToken::new();
        let guard = finished.clone().drop_guard();

        // Hold the map while spawning so the task's own removal cannot run before the insert
        let Ok(mut active) = self.polls.lock() else {
            tracing::error!("Poll registry poisoned; not polling call {}", call_id);
            return;
        };

        let handle = tokio::spawn(async move {
            let _guard = guard;
            poll_call(backend, store, &org_id, &call_id, &phone, poll_config).await;
            if let Ok(mut polls) = polls.lock() {
                if polls.get(&org_id).is_some_and(|entry| entry.generation == generation) {
                    polls.remove(&org_id);
                }
            }
        });

        active.insert(
            id.to_string(),
            PollEntry {
                generation,
                handle,
                finished,
            },
        );
    }

    /// Moves a `ready` organization to `scheduled`. No call is placed.
    pub async fn schedule(&self, id: &str, date: &str, time: &str) -> Result<Organization, LifecycleError> {
        if date.trim().is_empty() || time.trim().is_empty() {
            return Err(LifecycleError::EmptySchedule);
        }
        let when = format!("{} {}", date.trim(), time.trim());
        self.store.lock().await.apply(id, Transition::Schedule(when))
    }

    pub async fn cancel_schedule(&self, id: &str) -> Result<Organization, LifecycleError> {
        self.store.lock().await.apply(id, Transition::CancelSchedule)
    }

    /// Stops polling an in-flight call and returns the organization to `ready`
    pub async fn cancel_call(&self, id: &str) -> Result<Organization, LifecycleError> {
        if let Some(handle) = self.take_poll(id) {
            handle.abort();
        }
        self.store.lock().await.apply(id, Transition::CallFailed)
    }

    /// Waits for the organization's poll task to finish, if one is running.
    /// The poll stays registered, so it can still be cancelled meanwhile.
    pub async fn wait(&self, id: &str) {
        let finished = self
            .polls
            .lock()
            .ok()
            .and_then(|polls| polls.get(id).map(|entry| entry.finished.clone()));
        if let Some(finished) = finished {
            finished.cancelled().await;
        }
    }

    /// Aborts every in-flight poll and resets those organizations to `ready`
    pub async fn shutdown(&self) {
        let aborted = self.abort_all();
        let mut store = self.store.lock().await;
        for id in aborted {
            reset_calling(&mut store, &id);
        }
    }

    fn take_poll(&self, id: &str) -> Option<JoinHandle<()>> {
        self.polls
            .lock()
            .ok()
            .and_then(|mut polls| polls.remove(id))
            .map(|entry| entry.handle)
    }

    fn abort_all(&self) -> Vec<String> {
        let Ok(mut polls) = self.polls.lock() else {
            return Vec::new();
        };
        polls
            .drain()
            .map(|(id, entry)| {
                entry.handle.abort();
                id
            })
            .collect()
    }

    async fn reset(&self, id: &str) {
        reset_calling(&mut *self.store.lock().await, id);
    }
}

impl Drop for CallLifecycle {
    fn drop(&mut self) {
        let aborted = self.abort_all();
        if aborted.is_empty() {
            return;
        }
        match self.store.try_lock() {
            Ok(mut store) => {
                for id in &aborted {
                    reset_calling(&mut store, id);
                }
            }
            Err(_) => tracing::warn!(
                "Organization store busy during shutdown; {} calls left in calling state",
                aborted.len()
            ),
        }
    }
}

fn reset_calling(store: &mut OrganizationStore, id: &str) {
    if store.get(id).map(|o| o.status) == Some(OrganizationStatus::Calling) {
        if let Err(e) = store.apply(id, Transition::CallFailed) {
            tracing::warn!("Could not reset {}: {}", id, e);
        }
    }
}

async fn poll_call(
    backend: Arc<dyn CallBackend>,
    store: Arc<Mutex<OrganizationStore>>,
    id: &str,
    call_id: &str,
    phone: &str,
    poll_config: PollConfig,
) {
    for attempt in 1..=poll_config.max_attempts {
        tokio::time::sleep(poll_config.interval).await;

        let status = match backend.call_status(call_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!("Status check {} for call {} failed: {}", attempt, call_id, e);
                continue;
            }
        };
        if !status.completed {
            continue;
        }

        let summary = match fetch_summary(backend.as_ref(), phone, call_id).await {
            Some(summary) => Some(summary),
            None => status.summary,
        };

        let mut store = store.lock().await;
        let result = match summary {
            Some(summary) => store.apply(id, Transition::CallCompleted(summary)),
            None => {
                tracing::warn!("Call {} ended without a summary", call_id);
                store.apply(id, Transition::CallFailed)
            }
        };
        if let Err(e) = result {
            tracing::warn!("Could not record the outcome of call {}: {}", call_id, e);
        }
        return;
    }

    tracing::info!(
        "Call {} did not complete after {} checks; resetting",
        call_id,
        poll_config.max_attempts
    );
    reset_calling(&mut *store.lock().await, id);
}

/// Stored summary by phone, falling back to the call id
async fn fetch_summary(backend: &dyn CallBackend, phone: &str, call_id: &str) -> Option<CallSummary> {
    for key in [phone, call_id] {
        match backend.call_summary(key).await {
            Ok(Some(summary)) => return Some(summary),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to fetch summary for {}: {}", key, e),
        }
    }
    None
}
