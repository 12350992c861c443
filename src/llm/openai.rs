//! OpenAI-compatible chat backend.
//!
//! Works against OpenAI itself or any server exposing `/v1/chat/completions`,
//! including Ollama's compatibility layer.

use super::types::{
    AssistantReply, Conversation, ConversationMessage, ToolCallRequest, ToolDescriptor,
};
use super::ChatBackend;
use crate::config::ModelSettings;
use crate::error::{PalaverError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat backend speaking the OpenAI chat completions protocol.
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(settings: &ModelSettings, model: &str) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "ollama".to_string());

        Ok(Self {
            client: create_client(&api_base(&settings.host), &api_key, settings.timeout())?,
            model: model.to_string(),
        })
    }

    fn build_messages(&self, conversation: &Conversation) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(system) = conversation.system_prompt() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.to_string())
                    .build()
                    .map_err(request_error)?
                    .into(),
            );
        }

        for message in conversation.messages() {
            let built: ChatCompletionRequestMessage = match message {
                ConversationMessage::User { content } => {
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(content.clone())
                        .build()
                        .map_err(request_error)?
                        .into()
                }
                ConversationMessage::Assistant {
                    content,
                    tool_calls,
                } => {
                    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                    if !content.is_empty() {
                        args.content(content.clone());
                    }
                    if !tool_calls.is_empty() {
                        args.tool_calls(tool_calls.iter().map(to_openai_call).collect::<Vec<_>>());
                    }
                    args.build().map_err(request_error)?.into()
                }
                ConversationMessage::Tool {
                    tool_name,
                    call_id,
                    content,
                } => ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(call_id.clone().unwrap_or_else(|| tool_name.clone()))
                    .content(content.clone())
                    .build()
                    .map_err(request_error)?
                    .into(),
            };
            messages.push(built);
        }

        Ok(messages)
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    #[instrument(skip_all, fields(model = %self.model, messages = conversation.len()))]
    async fn chat(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(self.build_messages(conversation)?);
        if !tools.is_empty() {
            args.tools(tools.iter().map(to_openai_tool).collect::<Vec<_>>());
        }
        let request = args.build().map_err(request_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PalaverError::Model(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PalaverError::Model("No response from model".to_string()))?;

        let tool_calls: Vec<ToolCallRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(from_openai_call)
            .collect();

        debug!("Received reply with {} tool calls", tool_calls.len());

        Ok(AssistantReply {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Create a client with the configured timeout.
fn create_client(api_base: &str, api_key: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// `http://host:11434` -> `http://host:11434/v1`; hosts that already name a version are kept.
fn api_base(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.ends_with("/v1") {
        host.to_string()
    } else {
        format!("{}/v1", host)
    }
}

fn request_error(e: async_openai::error::OpenAIError) -> PalaverError {
    PalaverError::Model(format!("Failed to build chat request: {}", e))
}

fn to_openai_tool(descriptor: &ToolDescriptor) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: descriptor.name.clone(),
            description: Some(descriptor.description.clone()),
            parameters: Some(descriptor.parameters_schema()),
            strict: None,
        },
    }
}

fn to_openai_call(call: &ToolCallRequest) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone().unwrap_or_else(|| call.name.clone()),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        },
    }
}

/// Arguments arrive as a JSON string; text that is not JSON is kept verbatim
/// so argument decoding can report it.
fn from_openai_call(call: ChatCompletionMessageToolCall) -> ToolCallRequest {
    let arguments = serde_json::from_str::<Value>(&call.function.arguments)
        .unwrap_or(Value::String(call.function.arguments));
    ToolCallRequest::new(call.function.name, arguments).with_id(call.id)
}
