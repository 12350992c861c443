//! Web research command.

use super::agent::{run_agent, AgentProfile};
use crate::config::{search_prompt, ResponseFormat, Settings};
use crate::tools::web_tools;
use anyhow::Result;

pub async fn run_search(
    query: &str,
    model: Option<String>,
    format: ResponseFormat,
    num_results: Option<u32>,
    settings: &Settings,
    verbose: bool,
) -> Result<()> {
    let model = settings.model_or(model.as_deref(), &settings.model.default_model);
    let num_results = num_results.unwrap_or(settings.agent.num_results);

    let profile = AgentProfile::new(query, model, web_tools(settings, num_results)?)
        .with_system_prompt(search_prompt(format))
        .with_detail("Format", format.to_string())
        .with_detail("Results", num_results.to_string());
    run_agent(profile, settings, verbose).await
}
