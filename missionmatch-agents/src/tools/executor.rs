use anyhow::Result;
use providers::WebSearch;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::llm::{Tool, ToolCall};

pub const WEB_SEARCH_TOOL: &str = "web_search";
const DEFAULT_MAX_RESULTS: usize = 5;
const MAX_RESULTS_CAP: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    /// What to search the web for
    pub query: String,
    /// How many results to return (1-10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

/// Executes tool calls issued by the mission refiner
pub struct MissionToolExecutor {
    search: Option<Arc<dyn WebSearch>>,
}

impl MissionToolExecutor {
    pub fn new(search: Option<Arc<dyn WebSearch>>) -> Self {
        Self { search }
    }

    pub fn tools(&self) -> Vec<Tool> {
        vec![Tool::from_type::<WebSearchParams>(
            WEB_SEARCH_TOOL,
            "Search the web for local volunteer opportunities and organizations",
        )]
    }

    /// Runs a tool call and returns the text handed back to the model.
    ///
    /// Failures become textual tool results so the model can carry on; the
    /// boolean is `true` when the result describes an error.
    pub async fn execute(&self, call: &ToolCall) -> (String, bool) {
        match call.name.as_str() {
            WEB_SEARCH_TOOL => match self.web_search(call).await {
                Ok(result) => (result, false),
                Err(e) => {
                    tracing::warn!("web_search tool failed: {}", e);
                    (format!("Search failed: {}", e), true)
                }
            },
            other => (format!("Unknown tool: {}", other), true),
        }
    }

    async fn web_search(&self, call: &ToolCall) -> Result<String> {
        let params: WebSearchParams = call.parse_arguments()?;
        let search = self
            .search
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("web search is not configured"))?;

        let max_results = params
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_CAP);

        tracing::info!("Agent web_search: {:?} (max {})", params.query, max_results);
        let results = search.web_search(&params.query, max_results).await?;
        Ok(serde_json::to_string(&results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use providers::{ProviderError, WebSearchResult};
    use std::sync::Mutex;

    struct RecordingSearch {
        queries: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl WebSearch for RecordingSearch {
        async fn web_search(
            &self,
            query: &str,
            max_results: usize,
        ) -> Result<Vec<WebSearchResult>, ProviderError> {
            self.queries.lock().unwrap().push((query.to_string(), max_results));
            Ok(vec![WebSearchResult {
                title: "Food Bank".to_string(),
                url: "https://foodbank.example".to_string(),
                content: "Volunteers needed".to_string(),
                score: None,
            }])
        }
    }

    fn call(name: &str, input: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "toolu_1".to_string(),
            name: name.to_string(),
            input,
        }
    }

    #[tokio::test]
    async fn test_web_search_clamps_max_results() {
        let search = Arc::new(RecordingSearch {
            queries: Mutex::new(Vec::new()),
        });
        let executor = MissionToolExecutor::new(Some(search.clone()));

        let (result, is_error) = executor
            .execute(&call(
                WEB_SEARCH_TOOL,
                serde_json::json!({"query": "food bank Oakland", "max_results": 50}),
            ))
            .await;

        assert!(!is_error);
        assert!(result.contains("foodbank.example"));
        assert_eq!(
            search.queries.lock().unwrap().as_slice(),
            &[("food bank Oakland".to_string(), MAX_RESULTS_CAP)]
        );
    }

    #[tokio::test]
    async fn test_missing_search_and_unknown_tool_are_soft_errors() {
        let executor = MissionToolExecutor::new(None);

        let (result, is_error) = executor
            .execute(&call(WEB_SEARCH_TOOL, serde_json::json!({"query": "x"})))
            .await;
        assert!(is_error);
        assert!(result.contains("not configured"));

        let (result, is_error) = executor.execute(&call("send_email", serde_json::json!({}))).await;
        assert!(is_error);
        assert_eq!(result, "Unknown tool: send_email");
    }

    #[test]
    fn test_tool_schema_lists_query() {
        let tools = MissionToolExecutor::new(None).tools();
        assert_eq!(tools[0].name, WEB_SEARCH_TOOL);
        assert!(tools[0].input_schema["properties"]["query"].is_object());
    }
}
