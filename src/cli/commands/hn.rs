//! Hacker News research command.

use super::agent::{run_agent, AgentProfile};
use crate::config::{Settings, HACKER_NEWS_PROMPT};
use crate::tools::hacker_news_tools;
use anyhow::Result;

pub async fn run_hn(
    query: &str,
    model: Option<String>,
    num_results: Option<u32>,
    settings: &Settings,
    verbose: bool,
) -> Result<()> {
    let model = settings.model_or(model.as_deref(), &settings.model.default_model);
    let limit = num_results.unwrap_or(settings.agent.num_results);

    let profile = AgentProfile::new(query, model, hacker_news_tools(settings)?)
        .with_system_prompt(HACKER_NEWS_PROMPT)
        .with_limit(limit)
        .with_detail("Results", limit.to_string());
    run_agent(profile, settings, verbose).await
}
