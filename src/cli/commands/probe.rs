//! Tool-calling support probe.

use crate::agent::{Session, SessionConfig};
use crate::cli::Output;
use crate::config::Settings;
use crate::llm::{create_backend, ChatBackend};
use crate::tools::probe_tools;
use anyhow::Result;
use tracing::debug;

const PROBE_QUERY: &str = "Say hi";

/// Ask each model a trivial question with the echo tool attached and report
/// which ones accept tools. Always succeeds; results are printed.
pub async fn run_probe(models: &[String], settings: &Settings) -> Result<()> {
    let mut supported = Vec::new();
    let mut unsupported = Vec::new();

    for model in models {
        let backend = create_backend(&settings.model, model, None)?;
        match probe(backend.as_ref()).await {
            Ok(()) => {
                Output::check(true, &format!("{}: Supports tools", model));
                supported.push(model.as_str());
            }
            Err(reason) => {
                Output::check(false, &format!("{}: No tool support ({})", model, reason));
                unsupported.push(model.as_str());
            }
        }
    }

    Output::header("Summary");
    if !supported.is_empty() {
        Output::kv("Supported", &supported.join(", "));
    }
    if !unsupported.is_empty() {
        Output::kv("Unsupported", &unsupported.join(", "));
    }
    Ok(())
}

/// One model turn with the echo tool offered; an accepted request means support.
pub async fn probe(backend: &dyn ChatBackend) -> std::result::Result<(), String> {
    let registry = probe_tools().map_err(|e| e.to_string())?;
    let mut session = Session::new(backend, &registry, SessionConfig::new(1), None, PROBE_QUERY);
    session.step().await.map_err(|e| e.to_string())?;
    debug!("{} accepted a request with tools", backend.model());
    Ok(())
}
