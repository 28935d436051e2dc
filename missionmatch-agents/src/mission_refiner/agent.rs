use crate::llm::claude::DEFAULT_MODEL;
use crate::llm::{CompletionRequest, ContentBlock, LlmClient, Message, Role};
use crate::tools::MissionToolExecutor;
use std::sync::Arc;

const MAX_ITERATIONS: usize = 8;
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct MissionRefinerAgent {
    llm_client: Arc<dyn LlmClient>,
    tool_executor: Arc<MissionToolExecutor>,
    model: String,
    max_tokens: u32,
}

impl MissionRefinerAgent {
    pub fn new(llm_client: Arc<dyn LlmClient>, tool_executor: Arc<MissionToolExecutor>) -> Self {
        Self {
            llm_client,
            tool_executor,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Runs the agent and returns the text of its last message.
    pub async fn execute(
        &self,
        location: &str,
        mission: &str,
        timestamp: &str,
    ) -> anyhow::Result<String> {
        let system_prompt = super::system_prompt::build_system_prompt(location, mission, timestamp);
        let tools = self.tool_executor.tools();

        let mut messages = vec![Message::user(
            "Please refine my volunteer mission into a short plan.",
        )];

        for iteration in 0..MAX_ITERATIONS {
            tracing::info!("Mission refiner iteration {}", iteration);

            let request = CompletionRequest {
                model: self.model.clone(),
                max_tokens: self.max_tokens,
                system: Some(system_prompt.clone()),
                messages: messages.clone(),
                tools: tools.clone(),
            };

            let response = self.llm_client.complete(request).await?;
            let tool_calls = response.tool_calls();

            let content: Vec<ContentBlock> = response
                .content
                .into_iter()
                .filter(|block| !matches!(block, ContentBlock::Unsupported))
                .collect();
            messages.push(Message::assistant(content));

            if tool_calls.is_empty() {
                break;
            }

            let mut results = Vec::with_capacity(tool_calls.len());
            for tool_call in &tool_calls {
                let (content, is_error) = self.tool_executor.execute(tool_call).await;
                results.push(ContentBlock::ToolResult {
                    tool_use_id: tool_call.id.clone(),
                    content,
                    is_error,
                });
            }
            messages.push(Message {
                role: Role::User,
                content: results,
            });
        }

        last_assistant_text(&messages)
            .ok_or_else(|| anyhow::anyhow!("Agent finished without a text response"))
    }
}

/// Text of the most recent assistant message that has any
pub fn last_assistant_text(messages: &[Message]) -> Option<String> {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.text())
        .find(|text| !text.trim().is_empty())
        .map(|text| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, LlmError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedLlm {
        responses: Mutex<VecDeque<Vec<ContentBlock>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Vec<ContentBlock>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            let content = self.responses.lock().unwrap().pop_front().unwrap_or_default();
            Ok(CompletionResponse {
                content,
                stop_reason: None,
            })
        }
    }

    fn text(t: &str) -> ContentBlock {
        ContentBlock::Text { text: t.to_string() }
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![vec![text("Contact food banks in Oakland.")]]));
        let agent = MissionRefinerAgent::new(llm.clone(), Arc::new(MissionToolExecutor::new(None)));

        let summary = agent.execute("Oakland", "feed people", "now").await.unwrap();
        assert_eq!(summary, "Contact food banks in Oakland.");

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system.as_deref().unwrap().contains("feed people"));
        assert_eq!(requests[0].tools.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_trip_feeds_result_back() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            vec![
                text("Let me search."),
                ContentBlock::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "web_search".to_string(),
                    input: serde_json::json!({"query": "food banks Oakland"}),
                },
            ],
            vec![text("Reach out to the Alameda County Community Food Bank.")],
        ]));
        let agent = MissionRefinerAgent::new(llm.clone(), Arc::new(MissionToolExecutor::new(None)));

        let summary = agent.execute("Oakland", "feed people", "now").await.unwrap();
        assert_eq!(summary, "Reach out to the Alameda County Community Food Bank.");

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let tool_turn = requests[1].messages.last().unwrap();
        assert_eq!(tool_turn.role, Role::User);
        assert!(matches!(
            &tool_turn.content[0],
            ContentBlock::ToolResult { tool_use_id, is_error: true, .. } if tool_use_id == "toolu_1"
        ));
    }

    #[tokio::test]
    async fn test_iteration_cap_falls_back_to_last_text() {
        let looping: Vec<Vec<ContentBlock>> = (0..MAX_ITERATIONS)
            .map(|i| {
                vec![
                    text(&format!("Searching, attempt {i}")),
                    ContentBlock::ToolUse {
                        id: format!("toolu_{i}"),
                        name: "web_search".to_string(),
                        input: serde_json::json!({"query": "x"}),
                    },
                ]
            })
            .collect();
        let llm = Arc::new(ScriptedLlm::new(looping));
        let agent = MissionRefinerAgent::new(llm.clone(), Arc::new(MissionToolExecutor::new(None)));

        let summary = agent.execute("", "anything", "now").await.unwrap();
        assert_eq!(summary, format!("Searching, attempt {}", MAX_ITERATIONS - 1));
        assert_eq!(llm.requests.lock().unwrap().len(), MAX_ITERATIONS);
    }

    #[tokio::test]
    async fn test_empty_response_is_error() {
        let llm = Arc::new(ScriptedLlm::new(vec![vec![]]));
        let agent = MissionRefinerAgent::new(llm, Arc::new(MissionToolExecutor::new(None)));
        assert!(agent.execute("", "anything", "now").await.is_err());
    }
}
