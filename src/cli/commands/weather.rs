//! Weather and temperature commands.

use super::agent::{run_agent, AgentProfile};
use crate::config::Settings;
use crate::tools::{temperature_tools, weather_tools};
use anyhow::Result;

/// Answer a weather question with current conditions and forecast tools.
pub async fn run_weather(
    query: &str,
    model: Option<String>,
    settings: &Settings,
    verbose: bool,
) -> Result<()> {
    let model = settings.model_or(model.as_deref(), &settings.weather.model);
    let profile = AgentProfile::new(query, model, weather_tools(settings)?)
        .with_think(Some(settings.weather.think));
    run_agent(profile, settings, verbose).await
}

/// Ask for a city's temperature with the single `get_temperature` tool.
pub async fn run_temperature(
    city: &str,
    model: Option<String>,
    settings: &Settings,
    verbose: bool,
) -> Result<()> {
    let model = settings.model_or(model.as_deref(), &settings.weather.model);
    let query = format!("What is the temperature in {}?", city);
    let profile = AgentProfile::new(query, model, temperature_tools(settings)?)
        .with_think(Some(settings.weather.think));
    run_agent(profile, settings, verbose).await
}
