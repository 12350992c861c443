//! Configuration settings for Palaver.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub model: ModelSettings,
    pub agent: AgentSettings,
    pub weather: WeatherSettings,
    pub hacker_news: HackerNewsSettings,
    pub search: SearchSettings,
    pub image: ImageSettings,
}

/// Chat endpoint flavour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Native Ollama `/api/chat`.
    #[default]
    Ollama,
    /// Any OpenAI-compatible `/v1/chat/completions` endpoint.
    OpenAi,
}

/// Chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Which endpoint flavour to talk to.
    pub provider: Provider,
    /// Base URL of the chat server.
    pub host: String,
    /// API key for OpenAI-compatible endpoints. Falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Model used when a command does not override it.
    pub default_model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Ask reasoning models to think before answering (Ollama only).
    pub think: Option<bool>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            host: "http://localhost:11434".to_string(),
            api_key: None,
            default_model: "llama3.1:8b".to_string(),
            timeout_secs: 300,
            think: None,
        }
    }
}

impl ModelSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Tool-calling session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum number of model requests per session.
    pub max_turns: usize,
    /// Default number of results fetched by listing and search tools.
    pub num_results: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_turns: 10,
            num_results: 10,
        }
    }
}

/// wttr.in weather settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub base_url: String,
    /// Model for the weather commands.
    pub model: String,
    /// Enable thinking for the weather model.
    pub think: bool,
    /// Upper bound for forecast days (wttr.in serves three).
    pub max_forecast_days: u32,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: "https://wttr.in".to_string(),
            model: "qwen3:8b".to_string(),
            think: true,
            max_forecast_days: 3,
            timeout_secs: 10,
        }
    }
}

/// Hacker News API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HackerNewsSettings {
    pub base_url: String,
    /// Hard cap on stories per listing call.
    pub max_stories: u32,
    /// Number of top-level comments shown in story details.
    pub comment_count: usize,
    /// Characters kept per comment.
    pub comment_chars: usize,
    /// Ids scanned per list by `search_stories` (top, best, new).
    pub search_pool: [usize; 3],
    pub timeout_secs: u64,
}

impl Default for HackerNewsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            max_stories: 30,
            comment_count: 5,
            comment_chars: 500,
            search_pool: [100, 100, 50],
            timeout_secs: 10,
        }
    }
}

/// Web, news and image search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Base URL of a SearXNG-compatible instance with JSON output enabled.
    pub base_url: String,
    /// Characters kept from a fetched page.
    pub fetch_max_chars: usize,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            fetch_max_chars: 2000,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Terminal image rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Renderer binary, invoked as `<renderer> --size=<size> --colors=<colors> <file>`.
    pub renderer: String,
    pub size: String,
    pub colors: u32,
    pub timeout_secs: u64,
    /// Maximum candidate images tried per search.
    pub max_images: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            renderer: "chafa".to_string(),
            size: "60x30".to_string(),
            colors: 256,
            timeout_secs: 10,
            max_images: 5,
        }
    }
}

impl Settings {
    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&Path>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::PalaverError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("palaver")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Resolve the model for a command: explicit override, else the given fallback.
    pub fn model_or(&self, requested: Option<&str>, fallback: &str) -> String {
        requested
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}
