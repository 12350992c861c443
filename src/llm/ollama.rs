//! Native Ollama `/api/chat` backend.

use super::types::{
    AssistantReply, Conversation, ConversationMessage, ToolCallRequest, ToolDescriptor,
};
use super::ChatBackend;
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Ollama chat client.
pub struct OllamaBackend {
    host: String,
    model: String,
    think: Option<bool>,
    client: Client,
}

impl OllamaBackend {
    pub fn new(host: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            think: None,
            client,
        })
    }

    /// Enable or disable thinking for reasoning models. `None` leaves the server default.
    pub fn with_think(mut self, think: Option<bool>) -> Self {
        self.think = think;
        self
    }

    fn build_request<'a>(
        &'a self,
        conversation: &Conversation,
        tools: &'a [ToolDescriptor],
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);

        if let Some(system) = conversation.system_prompt() {
            messages.push(WireMessage::plain("system", system));
        }

        for message in conversation.messages() {
            messages.push(match message {
                ConversationMessage::User { content } => WireMessage::plain("user", content),
                ConversationMessage::Assistant {
                    content,
                    tool_calls,
                } => WireMessage {
                    tool_calls: tool_calls
                        .iter()
                        .map(|call| WireToolCall {
                            function: WireFunction {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect(),
                    ..WireMessage::plain("assistant", content)
                },
                ConversationMessage::Tool {
                    tool_name, content, ..
                } => WireMessage {
                    tool_name: Some(tool_name.clone()),
                    ..WireMessage::plain("tool", content)
                },
            });
        }

        ChatRequest {
            model: &self.model,
            messages,
            tools: tools
                .iter()
                .map(|t| WireTool {
                    r#type: "function",
                    function: WireToolFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: t.parameters_schema(),
                    },
                })
                .collect(),
            stream: false,
            think: self.think,
        }
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    /// Check whether the server answers on `/api/tags`.
    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Ollama health check failed: {}", e);
                false
            }
        }
    }

    #[instrument(skip_all, fields(model = %self.model, messages = conversation.len()))]
    async fn chat(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply> {
        let url = format!("{}/api/chat", self.host);
        let request = self.build_request(conversation, tools);

        debug!("Sending chat request with {} tools", tools.len());
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    PalaverError::Model(format!("Cannot connect to Ollama at {}: {}", self.host, e))
                } else if e.is_timeout() {
                    PalaverError::Model(format!("Ollama request timed out: {}", e))
                } else {
                    PalaverError::Model(format!("Ollama request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            if status.as_u16() == 404 && message.contains("not found") {
                return Err(PalaverError::Model(format!(
                    "{}. Pull it with: ollama pull {}",
                    message, self.model
                )));
            }
            return Err(PalaverError::Model(format!("HTTP {}: {}", status, message)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| PalaverError::Model(format!("Invalid Ollama response: {}", e)))?;

        if let Some(thinking) = body.message.thinking.as_deref().filter(|t| !t.is_empty()) {
            debug!("Model thinking: {}", thinking);
        }

        info!(
            "Chat turn completed in {:.2}s ({} tool calls)",
            start.elapsed().as_secs_f64(),
            body.message.tool_calls.len()
        );

        Ok(AssistantReply {
            content: body.message.content,
            tool_calls: body
                .message
                .tool_calls
                .into_iter()
                .map(|c| ToolCallRequest::new(c.function.name, c.function.arguments))
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
    #[serde(default, skip_serializing)]
    thinking: Option<String>,
}

impl WireMessage {
    fn plain(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            tool_calls: Vec::new(),
            tool_name: None,
            thinking: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    r#type: &'static str,
    function: WireToolFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}
