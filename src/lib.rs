//! palaver - let a local language model answer questions with live data
//!
//! A model is given a handful of typed tools (weather from wttr.in, Hacker
//! News, web/news/image search) and a bounded tool-calling loop executes the
//! calls it requests until it produces a final answer.
//!
//! # Architecture
//!
//! - `llm` - Chat backends (Ollama, OpenAI-compatible, scripted) and the conversation model
//! - `agent` - Tool registry and the tool-calling session
//! - `tools` - The tools themselves and per-command registries
//! - `config` - Settings and system prompts
//! - `cli` - Command-line interface and terminal formatting
//!
//! # Example
//!
//! ```rust,no_run
//! use palaver::agent::{Session, SessionConfig};
//! use palaver::config::Settings;
//! use palaver::llm::create_backend;
//! use palaver::tools::weather_tools;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load_from(None)?;
//!     let backend = create_backend(&settings.model, "qwen3:8b", None)?;
//!     let registry = weather_tools(&settings)?;
//!
//!     let mut session = Session::new(
//!         backend.as_ref(),
//!         &registry,
//!         SessionConfig::new(settings.agent.max_turns),
//!         None,
//!         "Will it rain in Bergen tomorrow?",
//!     );
//!     let outcome = session.run().await?;
//!     println!("{}", outcome.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod tools;

pub use error::{PalaverError, Result};
