use super::args::decode_args;
use super::ToolId;
use crate::agent::Tool;
use crate::error::Result;
use crate::llm::{ParamKind, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct EchoArgs {
    #[serde(default)]
    x: String,
}

/// Returns its argument unchanged. Offered to a model only to see whether it accepts tools.
pub struct EchoTool {
    descriptor: ToolDescriptor,
}

impl EchoTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                ToolId::Echo.as_str(),
                "Test function for tool support detection",
            )
            .required("x", ParamKind::String, "Any text"),
        }
    }
}

impl Default for EchoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn id(&self) -> ToolId {
        ToolId::Echo
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn error_context(&self) -> &'static str {
        "echoing"
    }

    async fn call(&self, arguments: &Value) -> Result<String> {
        let args: EchoArgs = decode_args(ToolId::Echo, arguments)?;
        Ok(args.x)
    }
}
