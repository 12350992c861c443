//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{Provider, Settings};
use crate::error::{PalaverError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// A model session needs credentials when talking to a hosted endpoint.
    Chat,
    /// Image rendering needs the renderer binary.
    Images,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat => {
            if settings.model.provider == Provider::OpenAi && is_hosted(&settings.model.host) {
                check_api_key(settings.model.api_key.as_deref())?;
            }
        }
        Operation::Images => {
            check_tool(&settings.image.renderer)?;
        }
    }
    Ok(())
}

/// Hosted OpenAI endpoints refuse requests without a real key.
fn is_hosted(host: &str) -> bool {
    host.contains("api.openai.com")
}

fn check_api_key(configured: Option<&str>) -> Result<()> {
    if configured.is_some_and(|k| !k.is_empty()) {
        return Ok(());
    }
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(PalaverError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(PalaverError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(PalaverError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PalaverError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(PalaverError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_chat_has_no_requirements() {
        assert!(check(Operation::Chat, &Settings::default()).is_ok());
    }

    #[test]
    fn test_missing_renderer() {
        let mut settings = Settings::default();
        settings.image.renderer = "palaver-no-such-renderer".to_string();
        match check(Operation::Images, &settings) {
            Err(PalaverError::ToolNotFound(name)) => assert_eq!(name, "palaver-no-such-renderer"),
            other => panic!("Expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_configured_key_satisfies_hosted_provider() {
        assert!(check_api_key(Some("sk-test")).is_ok());
    }
}
