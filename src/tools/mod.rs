//! Data-fetching tools the model can call.
//!
//! Every tool the crate knows is named by a [`ToolId`]; each command builds a
//! [`ToolRegistry`] from the subset it offers the model.

mod args;
mod echo;
mod hacker_news;
mod http;
mod image;
mod weather;
mod web;

pub use args::{decode_args, lenient_opt_uint, lenient_uint};
pub use echo::EchoTool;
pub use hacker_news::{HackerNewsClient, HackerNewsTool, Item};
pub use http::build_client;
pub use image::{
    print_image, ImageDisplay, ImageHit, ImageSearchTool, ImageSearcher, RenderOutcome, Renderer,
};
pub use weather::{WeatherClient, WeatherTool};
pub use web::{Category, SearchClient, SearchHit, WebTool};

use crate::agent::ToolRegistry;
use crate::config::Settings;
use crate::error::Result;
use std::sync::Arc;

/// Identifier of every tool this crate can offer to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    GetTemperature,
    GetWeather,
    GetWeatherForecast,
    GetTopStories,
    GetNewStories,
    GetBestStories,
    GetAskHn,
    GetShowHn,
    GetJobs,
    GetStoryDetails,
    SearchStories,
    WebSearch,
    NewsSearch,
    FetchUrl,
    ImageSearch,
    Echo,
}

impl ToolId {
    pub const ALL: [ToolId; 16] = [
        ToolId::GetTemperature,
        ToolId::GetWeather,
        ToolId::GetWeatherForecast,
        ToolId::GetTopStories,
        ToolId::GetNewStories,
        ToolId::GetBestStories,
        ToolId::GetAskHn,
        ToolId::GetShowHn,
        ToolId::GetJobs,
        ToolId::GetStoryDetails,
        ToolId::SearchStories,
        ToolId::WebSearch,
        ToolId::NewsSearch,
        ToolId::FetchUrl,
        ToolId::ImageSearch,
        ToolId::Echo,
    ];

    /// Name the model uses to call the tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::GetTemperature => "get_temperature",
            ToolId::GetWeather => "get_weather",
            ToolId::GetWeatherForecast => "get_weather_forecast",
            ToolId::GetTopStories => "get_top_stories",
            ToolId::GetNewStories => "get_new_stories",
            ToolId::GetBestStories => "get_best_stories",
            ToolId::GetAskHn => "get_ask_hn",
            ToolId::GetShowHn => "get_show_hn",
            ToolId::GetJobs => "get_jobs",
            ToolId::GetStoryDetails => "get_story_details",
            ToolId::SearchStories => "search_stories",
            ToolId::WebSearch => "web_search",
            ToolId::NewsSearch => "news_search",
            ToolId::FetchUrl => "fetch_url",
            ToolId::ImageSearch => "image_search",
            ToolId::Echo => "echo",
        }
    }
}

impl std::str::FromStr for ToolId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ToolId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-tool registry for the temperature demo.
pub fn temperature_tools(settings: &Settings) -> Result<ToolRegistry> {
    let client = Arc::new(WeatherClient::new(&settings.weather)?);
    ToolRegistry::new().with(WeatherTool::temperature(client))
}

/// Current weather and forecast.
pub fn weather_tools(settings: &Settings) -> Result<ToolRegistry> {
    let client = Arc::new(WeatherClient::new(&settings.weather)?);
    ToolRegistry::new()
        .with(WeatherTool::current(client.clone()))?
        .with(WeatherTool::forecast(client))
}

/// Hacker News listings, details and title search.
pub fn hacker_news_tools(settings: &Settings) -> Result<ToolRegistry> {
    let client = Arc::new(HackerNewsClient::new(&settings.hacker_news)?);
    let mut registry = ToolRegistry::new();
    for id in [
        ToolId::GetTopStories,
        ToolId::GetNewStories,
        ToolId::GetBestStories,
        ToolId::GetAskHn,
        ToolId::GetShowHn,
        ToolId::GetJobs,
        ToolId::GetStoryDetails,
        ToolId::SearchStories,
    ] {
        registry.register(Box::new(HackerNewsTool::new(id, client.clone())?))?;
    }
    Ok(registry)
}

/// Web, news and image search plus page fetch, each returning up to `num_results` hits.
pub fn web_tools(settings: &Settings, num_results: u32) -> Result<ToolRegistry> {
    let client = Arc::new(SearchClient::new(&settings.search)?);
    let images = ImageSearcher::new(client.clone(), Renderer::new(&settings.image));
    let image_count = num_results.min(settings.image.max_images);

    ToolRegistry::new()
        .with(WebTool::web_search(client.clone(), num_results))?
        .with(WebTool::news_search(client.clone(), num_results))?
        .with(WebTool::fetch_url(client))?
        .with(ImageSearchTool::new(images, image_count))
}

/// Trivial echo tool used to check whether a model supports tool calling.
pub fn probe_tools() -> Result<ToolRegistry> {
    ToolRegistry::new().with(EchoTool::new())
}
