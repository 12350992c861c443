//! Chat model backends.
//!
//! A backend turns the conversation so far plus the available tool
//! descriptors into one assistant reply. The native Ollama API and any
//! OpenAI-compatible endpoint are supported; a scripted backend replays
//! canned replies for tests.

mod ollama;
mod openai;
mod scripted;
mod types;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use scripted::{RecordedRequest, ScriptedBackend};
pub use types::{
    AssistantReply, Conversation, ConversationMessage, ParamKind, ParamSpec, ToolCallRequest,
    ToolDescriptor,
};

use crate::config::{ModelSettings, Provider};
use crate::error::Result;
use async_trait::async_trait;

/// Trait for chat completion with tool calling.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the full conversation and return the model's next message.
    async fn chat(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply>;

    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Model this backend talks to.
    fn model(&self) -> &str;

    /// Whether the endpoint is reachable. Backends without a cheap probe report true.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Build the backend selected by the settings for `model`.
pub fn create_backend(
    settings: &ModelSettings,
    model: &str,
    think: Option<bool>,
) -> Result<Box<dyn ChatBackend>> {
    match settings.provider {
        Provider::Ollama => Ok(Box::new(
            OllamaBackend::new(&settings.host, model, settings.timeout())?.with_think(think),
        )),
        Provider::OpenAi => Ok(Box::new(OpenAiBackend::new(settings, model)?)),
    }
}
