//! CLI module for palaver.

pub mod commands;
pub mod markdown;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::ResponseFormat;
use clap::{Parser, Subcommand};

/// palaver - let a local model answer questions with live data
///
/// Each command gives the model a small set of tools (weather, Hacker News,
/// web search) and prints its final answer.
#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show tool calls and results (-v), and raise log verbosity (-vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PALAVER_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask about current weather or the forecast
    Weather {
        /// Question, e.g. "Do I need an umbrella in Oslo tomorrow?"
        query: String,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a model for the temperature in a city using a single tool
    Temperature {
        /// City name
        city: String,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Explore Hacker News stories and discussions
    Hn {
        /// Your question or topic to explore
        query: String,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum stories per tool call
        #[arg(short = 'n', long)]
        num_results: Option<u32>,
    },

    /// Search the web and get a summarized answer
    Search {
        /// The search query
        query: String,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Answer format
        #[arg(short, long, value_enum, default_value_t = ResponseFormat::Bullets)]
        format: ResponseFormat,

        /// Number of search results to fetch
        #[arg(short = 'n', long)]
        num_results: Option<u32>,
    },

    /// Search for images and render them in the terminal (no model involved)
    Images {
        /// Search terms, one search each
        terms: Vec<String>,
    },

    /// Check which models support tool calling
    Probe {
        /// Model names, e.g. llama3.1:8b qwen3:8b
        #[arg(required = true)]
        models: Vec<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
