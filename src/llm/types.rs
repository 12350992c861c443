//! Conversation and tool-description types shared by every chat backend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

/// What the model is told about a tool it may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a required parameter.
    pub fn required(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.parameters.push(ParamSpec {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
        });
        self
    }

    /// Add an optional parameter.
    pub fn optional(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.parameters.push(ParamSpec {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: false,
        });
        self
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    /// JSON schema object describing the parameters.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.kind.as_str(),
                    "description": param.description,
                }),
            );
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation id, only set by endpoints that use one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Normally a JSON object; anything else fails argument decoding.
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationMessage {
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        tool_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
        content: String,
    },
}

/// Append-only chat history, seeded with a single user message.
///
/// The optional system prompt belongs to the seed, so the length of a
/// conversation is always `1 + assistant messages + tool messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    system_prompt: Option<String>,
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn new(system_prompt: Option<&str>, query: &str) -> Self {
        Self {
            system_prompt: system_prompt.map(str::to_string),
            messages: vec![ConversationMessage::User {
                content: query.to_string(),
            }],
        }
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_assistant(&mut self, reply: AssistantReply) {
        self.messages.push(ConversationMessage::Assistant {
            content: reply.content,
            tool_calls: reply.tool_calls,
        });
    }

    pub fn push_tool(&mut self, call: &ToolCallRequest, content: String) {
        self.messages.push(ConversationMessage::Tool {
            tool_name: call.name.clone(),
            call_id: call.id.clone(),
            content,
        });
    }

    /// Text of the most recent assistant message, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            ConversationMessage::Assistant { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn count_assistant(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, ConversationMessage::Assistant { .. }))
            .count()
    }

    pub fn count_tool(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, ConversationMessage::Tool { .. }))
            .count()
    }
}

/// One response from the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantReply {
    /// A final answer with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A reply requesting the given tool calls.
    pub fn calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
        }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_schema() {
        let descriptor = ToolDescriptor::new("search_stories", "Search stories")
            .required("query", ParamKind::String, "Search term")
            .optional("limit", ParamKind::Integer, "Maximum results");

        let schema = descriptor.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["required"], json!(["query"]));
        assert!(descriptor.has_param("limit"));
        assert!(!descriptor.has_param("days"));
    }

    #[test]
    fn test_empty_schema_has_no_required() {
        let schema = ToolDescriptor::new("get_jobs", "Jobs").parameters_schema();
        assert_eq!(schema["properties"], json!({}));
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_conversation_counts() {
        let mut conversation = Conversation::new(Some("be brief"), "weather in Oslo?");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.system_prompt(), Some("be brief"));
        assert_eq!(conversation.last_assistant_text(), None);

        let call = ToolCallRequest::new("get_weather", json!({"city": "Oslo"}));
        conversation.push_assistant(AssistantReply::calls(vec![call.clone()]));
        conversation.push_tool(&call, "Oslo: Sunny, +5°C".to_string());
        conversation.push_assistant(AssistantReply::text("Sunny and 5°C."));

        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.count_assistant(), 2);
        assert_eq!(conversation.count_tool(), 1);
        assert_eq!(conversation.last_assistant_text(), Some("Sunny and 5°C."));
    }

    #[test]
    fn test_message_serializes_with_role_tag() {
        let message = ConversationMessage::Tool {
            tool_name: "get_weather".to_string(),
            call_id: None,
            content: "ok".to_string(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"role": "tool", "tool_name": "get_weather", "content": "ok"}));
    }
}
