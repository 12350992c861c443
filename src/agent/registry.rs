//! Tool registry: the fixed set of tools the model may call in one run.

use crate::error::{PalaverError, Result};
use crate::llm::ToolDescriptor;
use crate::tools::ToolId;
use async_trait::async_trait;
use serde_json::Value;

/// A tool the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn id(&self) -> ToolId;

    fn descriptor(&self) -> &ToolDescriptor;

    /// Phrase completing "Error ..." when the call fails, e.g. `fetching weather`.
    fn error_context(&self) -> &'static str;

    /// Decode `arguments` and run the tool.
    ///
    /// Argument problems come back as [`PalaverError::InvalidArguments`].
    async fn call(&self, arguments: &Value) -> Result<String>;
}

/// Immutable mapping from tool id to implementation.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Registering the same id twice is a configuration error.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let id = tool.id();
        if tool.descriptor().name != id.as_str() {
            return Err(PalaverError::Config(format!(
                "Tool {} describes itself as {}",
                id,
                tool.descriptor().name
            )));
        }
        if self.tools.iter().any(|t| t.id() == id) {
            return Err(PalaverError::DuplicateTool(id.to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: impl Tool + 'static) -> Result<Self> {
        self.register(Box::new(tool))?;
        Ok(self)
    }

    /// Look up a tool by the exact name the model used.
    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        let id: ToolId = name.parse().ok()?;
        self.tools.iter().find(|t| t.id() == id).map(|t| t.as_ref())
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor().clone()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.id().as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Tool result substituted when the model names a tool that is not registered.
pub fn unknown_tool_message(name: &str) -> String {
    format!("Unknown function: {}", name)
}
