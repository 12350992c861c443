//! Tool-calling session: request, execute, respond, until the model answers.

use super::registry::{unknown_tool_message, ToolRegistry};
use crate::error::{PalaverError, Result};
use crate::llm::{ChatBackend, Conversation, ToolCallRequest, ToolDescriptor};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Where the session is in its request/execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingModel,
    ExecutingTools,
    Done,
}

/// Per-run session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of model requests; at least one.
    pub max_turns: usize,
    /// Global cap clamped into, or injected as, a tool's `limit` argument.
    pub limit: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            limit: None,
        }
    }
}

impl SessionConfig {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hooks for displaying a session while it runs.
pub trait SessionObserver: Send + Sync {
    /// Called before a tool runs, with the arguments it will actually receive.
    fn on_tool_call(&self, _name: &str, _arguments: &Value) {}

    fn on_tool_result(&self, _name: &str, _result: &str) {}
}

/// Record of a tool call made during the session.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// Effective arguments passed to the tool.
    pub arguments: Value,
    /// Text fed back to the model.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Result of a finished session.
#[derive(Debug)]
pub struct SessionOutcome {
    /// Text of the last assistant message.
    pub answer: String,
    /// Number of model requests made.
    pub turns: usize,
    /// True when the turn limit stopped the session before a final answer.
    pub truncated: bool,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Drives one conversation between the model and the registered tools.
pub struct Session<'a> {
    backend: &'a dyn ChatBackend,
    registry: &'a ToolRegistry,
    config: SessionConfig,
    observer: Option<&'a dyn SessionObserver>,
    descriptors: Vec<ToolDescriptor>,
    conversation: Conversation,
    state: SessionState,
    pending: Vec<ToolCallRequest>,
    turns: usize,
    truncated: bool,
    records: Vec<ToolCallRecord>,
}

impl<'a> Session<'a> {
    pub fn new(
        backend: &'a dyn ChatBackend,
        registry: &'a ToolRegistry,
        config: SessionConfig,
        system_prompt: Option<&str>,
        query: &str,
    ) -> Self {
        Self {
            backend,
            registry,
            config: SessionConfig {
                max_turns: config.max_turns.max(1),
                ..config
            },
            observer: None,
            descriptors: registry.descriptors(),
            conversation: Conversation::new(system_prompt, query),
            state: SessionState::AwaitingModel,
            pending: Vec::new(),
            turns: 0,
            truncated: false,
            records: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn SessionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run until [`SessionState::Done`].
    ///
    /// Only a failing chat endpoint is an error; tool failures become tool results.
    pub async fn run(&mut self) -> Result<SessionOutcome> {
        while self.state != SessionState::Done {
            self.step().await?;
        }
        Ok(self.outcome())
    }

    /// Advance by one transition and return the new state.
    pub async fn step(&mut self) -> Result<SessionState> {
        self.state = match self.state {
            SessionState::AwaitingModel => self.request_model().await?,
            SessionState::ExecutingTools => self.execute_pending().await,
            SessionState::Done => SessionState::Done,
        };
        Ok(self.state)
    }

    /// Summary of the session so far.
    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            answer: self
                .conversation
                .last_assistant_text()
                .unwrap_or_default()
                .to_string(),
            turns: self.turns,
            truncated: self.truncated,
            tool_calls: self.records.clone(),
        }
    }

    async fn request_model(&mut self) -> Result<SessionState> {
        if self.turns >= self.config.max_turns {
            warn!(
                "Stopping after {} model turns without a final answer",
                self.turns
            );
            self.truncated = true;
            return Ok(SessionState::Done);
        }

        self.turns += 1;
        debug!("Session turn {}", self.turns);

        let reply = self
            .backend
            .chat(&self.conversation, &self.descriptors)
            .await?;

        let next = if reply.wants_tools() {
            self.pending = reply.tool_calls.clone();
            SessionState::ExecutingTools
        } else {
            SessionState::Done
        };

        self.conversation.push_assistant(reply);
        Ok(next)
    }

    async fn execute_pending(&mut self) -> SessionState {
        for call in std::mem::take(&mut self.pending) {
            let (arguments, result) = self.execute_call(&call).await;
            self.conversation.push_tool(&call, result.clone());
            self.records.push(ToolCallRecord {
                name: call.name,
                arguments,
                result,
            });
        }
        SessionState::AwaitingModel
    }

    /// Execute one call; every failure is turned into result text.
    async fn execute_call(&self, call: &ToolCallRequest) -> (Value, String) {
        let Some(tool) = self.registry.resolve(&call.name) else {
            warn!("Model requested unknown tool: {}", call.name);
            if let Some(observer) = self.observer {
                observer.on_tool_call(&call.name, &call.arguments);
            }
            let result = unknown_tool_message(&call.name);
            if let Some(observer) = self.observer {
                observer.on_tool_result(&call.name, &result);
            }
            return (call.arguments.clone(), result);
        };

        let arguments = match self.config.limit {
            Some(limit) => apply_limit(
                call.arguments.clone(),
                tool.descriptor().has_param("limit"),
                limit,
            ),
            None => call.arguments.clone(),
        };

        info!("Calling tool {} with {}", call.name, arguments);
        if let Some(observer) = self.observer {
            observer.on_tool_call(&call.name, &arguments);
        }

        let result = match tool.call(&arguments).await {
            Ok(output) => output,
            Err(PalaverError::InvalidArguments { tool, reason }) => {
                format!("Error: invalid arguments for {}: {}", tool, reason)
            }
            Err(e) => format!("Error {}: {}", tool.error_context(), e),
        };

        if let Some(observer) = self.observer {
            observer.on_tool_result(&call.name, &result);
        }
        (arguments, result)
    }
}

/// Clamp a present `limit` to the global cap, or inject the cap when the tool
/// takes a `limit` the model left out.
///
/// A `limit` that is not a non-negative whole number is replaced by the cap.
pub fn apply_limit(arguments: Value, accepts_limit: bool, cap: u32) -> Value {
    let mut map = match arguments {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => return other,
    };

    match map.get("limit") {
        Some(requested) => {
            let effective = requested_limit(requested)
                .map(|n| n.min(u64::from(cap)))
                .unwrap_or(u64::from(cap));
            map.insert("limit".to_string(), Value::from(effective));
        }
        None if accepts_limit => {
            map.insert("limit".to_string(), Value::from(cap));
        }
        None => {}
    }

    Value::Object(map)
}

fn requested_limit(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
