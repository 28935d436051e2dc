pub mod claude;

pub use claude::ClaudeClient;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid tool arguments for {tool}: {source}")]
    ToolArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// Block types this client does not act on (thinking, server tools, ...)
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Concatenated text blocks, ignoring tool traffic
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl Tool {
    /// Describes a tool whose arguments deserialize into `T`
    pub fn from_type<T: JsonSchema>(name: &str, description: &str) -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: serde_json::to_value(schema).unwrap_or(Value::Null),
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolCall {
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(&self) -> Result<T, LlmError> {
        serde_json::from_value(self.input.clone()).map_err(|source| LlmError::ToolArguments {
            tool: self.name.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl CompletionResponse {
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_block_wire_format() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: "[]".to_string(),
            is_error: false,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert!(value.get("is_error").is_none());

        let parsed: ContentBlock = serde_json::from_str(
            r#"{"type":"tool_use","id":"toolu_2","name":"web_search","input":{"query":"food bank"}}"#,
        )
        .unwrap();
        assert!(matches!(parsed, ContentBlock::ToolUse { ref name, .. } if name == "web_search"));
    }

    #[test]
    fn test_message_text_skips_tool_blocks() {
        let message = Message::assistant(vec![
            ContentBlock::Text { text: "Looking that up.".to_string() },
            ContentBlock::ToolUse {
                id: "toolu_1".to_string(),
                name: "web_search".to_string(),
                input: serde_json::json!({}),
            },
            ContentBlock::Text { text: "Done.".to_string() },
        ]);
        assert_eq!(message.text(), "Looking that up.\nDone.");
    }
}
