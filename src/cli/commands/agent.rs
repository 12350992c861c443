//! Shared driver for the model-backed commands.

use crate::agent::{Session, SessionConfig, SessionObserver, ToolRegistry};
use crate::cli::markdown::format_answer;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::llm::create_backend;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;

/// What a command hands to the agent: query, model and tools.
pub struct AgentProfile {
    pub query: String,
    pub model: String,
    pub think: Option<bool>,
    pub system_prompt: Option<String>,
    pub registry: ToolRegistry,
    /// Cap applied to `limit` arguments.
    pub limit: Option<u32>,
    /// Extra `[Label] value` lines for the verbose header.
    pub details: Vec<(&'static str, String)>,
}

impl AgentProfile {
    pub fn new(query: impl Into<String>, model: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            query: query.into(),
            model: model.into(),
            think: None,
            system_prompt: None,
            registry,
            limit: None,
            details: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_think(mut self, think: Option<bool>) -> Self {
        self.think = think;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_detail(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.details.push((label, value.into()));
        self
    }
}

/// Prints each tool call and its result as the session runs.
struct VerboseObserver;

impl SessionObserver for VerboseObserver {
    fn on_tool_call(&self, name: &str, arguments: &Value) {
        Output::tool_call(name, arguments);
    }

    fn on_tool_result(&self, _name: &str, result: &str) {
        Output::tool_result(result);
    }
}

/// Run one question through the model with the profile's tools and print the answer.
pub async fn run_agent(profile: AgentProfile, settings: &Settings, verbose: bool) -> Result<()> {
    preflight::check(Operation::Chat, settings)?;

    let think = profile.think.or(settings.model.think);
    let backend = create_backend(&settings.model, &profile.model, think)?;
    if !backend.health_check().await {
        bail!(
            "Cannot reach {} at {}. Is it running?",
            backend.name(),
            settings.model.host
        );
    }

    if verbose {
        Output::label("Model", &profile.model);
        for (label, value) in &profile.details {
            Output::label(label, value);
        }
        Output::label("Query", &profile.query);
        Output::divider();
    }

    let mut config = SessionConfig::new(settings.agent.max_turns);
    if let Some(limit) = profile.limit {
        config = config.with_limit(limit);
    }

    let observer = VerboseObserver;
    let mut session = Session::new(
        backend.as_ref(),
        &profile.registry,
        config,
        profile.system_prompt.as_deref(),
        &profile.query,
    );
    if verbose {
        session = session.with_observer(&observer);
    }

    let spinner = (!verbose).then(|| Output::spinner("Thinking..."));
    let result = session.run().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let outcome = result.context("Model request failed")?;
    info!(
        "Session finished after {} turn(s) and {} tool call(s)",
        outcome.turns,
        outcome.tool_calls.len()
    );

    if verbose {
        Output::final_answer_header();
    }
    println!("{}", format_answer(&outcome.answer, Output::colors_enabled()));

    if outcome.truncated {
        Output::warning(&format!(
            "Stopped after {} model turns without a final answer",
            outcome.turns
        ));
    }

    Ok(())
}
