use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{
    CallStatusResponse, CallSummary, CallSummaryResponse, NotesResponse, OrgNote, Organization,
    OrganizationSearchRequest, OrganizationSearchResponse, RefineRequest, RefineResponse,
    VoiceCallRequest, VoiceCallResponse,
};

use crate::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// The MissionMatch backend as seen by the client
#[async_trait]
pub trait CallBackend: Send + Sync {
    /// Returns the refiner agent's text for the mission
    async fn refine_mission(&self, mission: &str, location: &str) -> Result<String, ClientError>;

    async fn search_organizations(
        &self,
        mission: &str,
        location: &str,
    ) -> Result<Vec<Organization>, ClientError>;

    /// Places an outbound call and returns its call id
    async fn start_call(&self, request: &VoiceCallRequest) -> Result<String, ClientError>;

    async fn call_status(&self, call_id: &str) -> Result<CallStatusResponse, ClientError>;

    /// Stored summary by phone number or call id
    async fn call_summary(&self, key: &str) -> Result<Option<CallSummary>, ClientError>;

    async fn notes(&self) -> Result<Vec<OrgNote>, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// `CallBackend` over HTTP with reqwest
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ClientError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|source| ClientError::Http {
            path: path.to_string(),
            source,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                path: path.to_string(),
                source,
            })?;
        Self::decode(path, response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                path: path.to_string(),
                source,
            })?;
        Self::decode(path, response).await
    }
}

#[async_trait]
impl CallBackend for HttpBackend {
    async fn refine_mission(&self, mission: &str, location: &str) -> Result<String, ClientError> {
        let request = RefineRequest {
            mission: Some(mission.to_string()),
            location: Some(location.to_string()),
            timestamp: None,
        };
        let response: RefineResponse = self.post("/api/agents/refine", &request).await?;
        Ok(response.agent_response)
    }

    async fn search_organizations(
        &self,
        mission: &str,
        location: &str,
    ) -> Result<Vec<Organization>, ClientError> {
        let request = OrganizationSearchRequest {
            mission: Some(mission.to_string()),
            location: Some(location.to_string()),
        };
        let response: OrganizationSearchResponse =
            self.post("/api/organizations/search", &request).await?;
        Ok(response.organizations)
    }

    async fn start_call(&self, request: &VoiceCallRequest) -> Result<String, ClientError> {
        let response: VoiceCallResponse = self.post("/api/voice/call", request).await?;
        Ok(response.call_id)
    }

    async fn call_status(&self, call_id: &str) -> Result<CallStatusResponse, ClientError> {
        self.get(&format!("/api/voice/call/{call_id}"), &[]).await
    }

    async fn call_summary(&self, key: &str) -> Result<Option<CallSummary>, ClientError> {
        let response: CallSummaryResponse =
            self.get("/api/call-summaries", &[("key", key)]).await?;
        Ok(response.data)
    }

    async fn notes(&self) -> Result<Vec<OrgNote>, ClientError> {
        let response: NotesResponse = self.get("/api/notes", &[]).await?;
        Ok(response.notes)
    }
}
