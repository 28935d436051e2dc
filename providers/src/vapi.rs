use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::CallSummary;

use crate::error::check_status;
use crate::ProviderError;

const PROVIDER: &str = "vapi";
const DEFAULT_BASE_URL: &str = "https://api.vapi.ai";

#[derive(Debug, Clone)]
pub struct VapiSettings {
    pub api_key: String,
    pub phone_number_id: String,
    pub assistant_id: String,
}

/// An outbound call to place
#[derive(Debug, Clone)]
pub struct OutboundCall {
    pub to: String,
    pub first_message: String,
    pub organization_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCallRequest<'a> {
    assistant_id: &'a str,
    phone_number_id: &'a str,
    customer: Customer<'a>,
    assistant_overrides: AssistantOverrides<'a>,
}

#[derive(Debug, Serialize)]
struct Customer<'a> {
    number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistantOverrides<'a> {
    first_message: &'a str,
    variable_values: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapiCustomer {
    pub number: Option<String>,
    pub name: Option<String>,
}

/// Call object as returned by `GET /call/{id}` and embedded in server messages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapiCall {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ended_reason: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub analysis: Option<Value>,
    #[serde(default)]
    pub customer: Option<VapiCustomer>,
}

impl VapiCall {
    pub fn is_ended(&self) -> bool {
        self.status.as_deref() == Some("ended")
    }

    pub fn customer_number(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.number.as_deref())
    }

    /// Builds the call outcome; `None` until the call has ended.
    pub fn call_summary(&self) -> Option<CallSummary> {
        if !self.is_ended() {
            return None;
        }
        Some(build_call_summary(
            self.analysis.as_ref(),
            self.summary.as_deref(),
            self.ended_reason.as_deref(),
        ))
    }
}

/// Envelope of a VAPI server (webhook) message
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMessageEnvelope {
    pub message: ServerMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub call: Option<VapiCall>,
    #[serde(default)]
    pub analysis: Option<Value>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub ended_reason: Option<String>,
    #[serde(default)]
    pub customer: Option<VapiCustomer>,
}

impl ServerMessage {
    pub fn is_end_of_call_report(&self) -> bool {
        self.message_type == "end-of-call-report"
    }

    pub fn call_summary(&self) -> CallSummary {
        let call = self.call.as_ref();
        build_call_summary(
            self.analysis.as_ref().or_else(|| call.and_then(|c| c.analysis.as_ref())),
            self.summary.as_deref().or_else(|| call.and_then(|c| c.summary.as_deref())),
            self.ended_reason
                .as_deref()
                .or_else(|| call.and_then(|c| c.ended_reason.as_deref())),
        )
    }

    pub fn customer_number(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.number.as_deref())
            .or_else(|| self.call.as_ref().and_then(|c| c.customer_number()))
    }
}

/// Maps VAPI analysis output onto a [`CallSummary`].
///
/// Structured data is read leniently: keys may be camelCase or snake_case and
/// `nextSteps` may be a list or a single string.
pub fn build_call_summary(
    analysis: Option<&Value>,
    summary: Option<&str>,
    ended_reason: Option<&str>,
) -> CallSummary {
    let structured = analysis.and_then(|a| a.get("structuredData"));

    let text = analysis
        .and_then(|a| a.get("summary"))
        .and_then(Value::as_str)
        .or(summary)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match ended_reason {
            Some(reason) => format!("Call ended ({reason}) without a summary."),
            None => "Call ended without a summary.".to_string(),
        });

    CallSummary {
        summary: text,
        contact_name: string_field(structured, &["contactName", "contact_name"]),
        interested: structured
            .and_then(|s| field(s, &["interested"]))
            .and_then(Value::as_bool),
        next_steps: structured.and_then(|s| field(s, &["nextSteps", "next_steps"])).and_then(
            |v| match v {
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                ),
                Value::String(step) if !step.trim().is_empty() => Some(vec![step.clone()]),
                _ => None,
            },
        ),
        availability: string_field(structured, &["availability"]),
        callback_date: string_field(structured, &["callbackDate", "callback_date"]),
        vapi_analysis: analysis.cloned(),
    }
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| value.get(*name)).filter(|v| !v.is_null())
}

fn string_field(structured: Option<&Value>, names: &[&str]) -> Option<String> {
    structured
        .and_then(|s| field(s, names))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Thin client for the VAPI voice-calling API
pub struct VapiClient {
    http: reqwest::Client,
    settings: VapiSettings,
    base_url: String,
}

impl VapiClient {
    pub fn new(http: reqwest::Client, settings: VapiSettings) -> Self {
        Self {
            http,
            settings,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Places an outbound call and returns the VAPI call id.
    pub async fn create_call(&self, call: &OutboundCall) -> Result<String, ProviderError> {
        let request = CreateCallRequest {
            assistant_id: &self.settings.assistant_id,
            phone_number_id: &self.settings.phone_number_id,
            customer: Customer {
                number: &call.to,
                name: call.organization_name.as_deref(),
            },
            assistant_overrides: AssistantOverrides {
                first_message: &call.first_message,
                variable_values: serde_json::json!({
                    "organizationName": call.organization_name.clone().unwrap_or_default(),
                }),
            },
        };

        let response = self
            .http
            .post(format!("{}/call", self.base_url))
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let created: VapiCall = check_status(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        tracing::info!("VAPI call {} created for {}", created.id, call.to);
        Ok(created.id)
    }

    pub async fn get_call(&self, call_id: &str) -> Result<VapiCall, ProviderError> {
        let response = self
            .http
            .get(format!("{}/call/{}", self.base_url, call_id))
            .bearer_auth(&self.settings.api_key)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        check_status(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::http(PROVIDER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings() -> VapiSettings {
        VapiSettings {
            api_key: "vapi-key".to_string(),
            phone_number_id: "phone-1".to_string(),
            assistant_id: "assistant-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/call")
            .match_header("authorization", "Bearer vapi-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "assistantId": "assistant-1",
                "phoneNumberId": "phone-1",
                "customer": { "number": "+14155551212", "name": "Food Bank" },
                "assistantOverrides": { "firstMessage": "Hello there" }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"call-123","status":"queued"}"#)
            .create_async()
            .await;

        let client = VapiClient::new(reqwest::Client::new(), settings()).with_base_url(server.url());
        let id = client
            .create_call(&OutboundCall {
                to: "+14155551212".to_string(),
                first_message: "Hello there".to_string(),
                organization_name: Some("Food Bank".to_string()),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(id, "call-123");
    }

    #[tokio::test]
    async fn test_get_ended_call_builds_summary() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/call/call-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "id": "call-123",
                    "status": "ended",
                    "endedReason": "customer-ended-call",
                    "customer": { "number": "+14155551212" },
                    "analysis": {
                        "summary": "Coordinator Dana welcomed weekend help.",
                        "structuredData": {
                            "contactName": "Dana",
                            "interested": true,
                            "nextSteps": "Email the signup form",
                            "callbackDate": null
                        }
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = VapiClient::new(reqwest::Client::new(), settings()).with_base_url(server.url());
        let call = client.get_call("call-123").await.unwrap();

        assert!(call.is_ended());
        assert_eq!(call.customer_number(), Some("+14155551212"));

        let summary = call.call_summary().unwrap();
        assert_eq!(summary.summary, "Coordinator Dana welcomed weekend help.");
        assert_eq!(summary.contact_name.as_deref(), Some("Dana"));
        assert_eq!(summary.interested, Some(true));
        assert_eq!(summary.next_steps, Some(vec!["Email the signup form".to_string()]));
        assert!(summary.callback_date.is_none());
        assert!(summary.vapi_analysis.is_some());
    }

    #[test]
    fn test_in_progress_call_has_no_summary() {
        let call: VapiCall =
            serde_json::from_str(r#"{"id":"c","status":"in-progress"}"#).unwrap();
        assert!(!call.is_ended());
        assert!(call.call_summary().is_none());
    }

    #[test]
    fn test_summary_falls_back_to_ended_reason() {
        let summary = build_call_summary(None, None, Some("no-answer"));
        assert_eq!(summary.summary, "Call ended (no-answer) without a summary.");
        assert!(summary.interested.is_none());
    }

    #[test]
    fn test_end_of_call_report() {
        let envelope: ServerMessageEnvelope = serde_json::from_str(
            r#"{
                "message": {
                    "type": "end-of-call-report",
                    "endedReason": "assistant-ended-call",
                    "summary": "They need drivers on Saturdays.",
                    "analysis": { "structuredData": { "next_steps": ["Call back Friday"], "availability": "Saturdays" } },
                    "call": { "id": "call-9", "customer": { "number": "+15105550100" } }
                }
            }"#,
        )
        .unwrap();

        let message = envelope.message;
        assert!(message.is_end_of_call_report());
        assert_eq!(message.customer_number(), Some("+15105550100"));

        let summary = message.call_summary();
        assert_eq!(summary.summary, "They need drivers on Saturdays.");
        assert_eq!(summary.next_steps, Some(vec!["Call back Friday".to_string()]));
        assert_eq!(summary.availability.as_deref(), Some("Saturdays"));
    }
}
