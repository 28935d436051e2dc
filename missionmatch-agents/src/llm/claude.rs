use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Anthropic Messages API client
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LlmClient for ClaudeClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ContentBlock, Message};
    use mockito::Matcher;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 256,
            system: Some("Be brief.".to_string()),
            messages: vec![Message::user("hello")],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_complete_parses_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-test")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "system": "Be brief.",
                "messages": [{ "role": "user", "content": [{ "type": "text", "text": "hello" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"msg_1","content":[{"type":"text","text":"Hi!"}],"stop_reason":"end_turn"}"#,
            )
            .create_async()
            .await;

        let client = ClaudeClient::new(reqwest::Client::new(), "sk-test").with_base_url(server.url());
        let response = client.complete(request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            response.content,
            vec![ContentBlock::Text { text: "Hi!".to_string() }]
        );
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }

    #[tokio::test]
    async fn test_api_error_keeps_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body(r#"{"type":"error","error":{"type":"overloaded_error"}}"#)
            .create_async()
            .await;

        let client = ClaudeClient::new(reqwest::Client::new(), "sk-test").with_base_url(server.url());
        match client.complete(request()).await {
            Err(LlmError::Api { status, .. }) => assert_eq!(status, 529),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
