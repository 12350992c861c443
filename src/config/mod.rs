//! Configuration module for Palaver.
//!
//! Handles loading and managing application settings and system prompts.

mod prompts;
mod settings;

pub use prompts::{search_prompt, ResponseFormat, HACKER_NEWS_PROMPT, SEARCH_BASE_PROMPT};
pub use settings::{
    AgentSettings, HackerNewsSettings, ImageSettings, ModelSettings, Provider, SearchSettings,
    Settings, WeatherSettings,
};
