//! Scripted backend that replays canned replies.
//!
//! Used in tests to drive a session without a model server. Every request is
//! recorded so callers can check exactly what was sent on each turn.

use super::types::{AssistantReply, Conversation, ToolDescriptor};
use super::ChatBackend;
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request captured by [`ScriptedBackend`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub conversation: Conversation,
    pub tool_names: Vec<String>,
}

/// Backend returning queued replies in order.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<AssistantReply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<AssistantReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply.
    pub fn push_reply(&self, reply: AssistantReply) {
        self.lock_replies().push_back(Ok(reply));
    }

    /// Queue an endpoint failure.
    pub fn push_error(&self, message: &str) {
        self.lock_replies()
            .push_back(Err(PalaverError::Model(message.to_string())));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<AssistantReply>>> {
        self.replies.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                conversation: conversation.clone(),
                tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            });

        self.lock_replies()
            .pop_front()
            .unwrap_or_else(|| Err(PalaverError::Model("Script exhausted".to_string())))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
