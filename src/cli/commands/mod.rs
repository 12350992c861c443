//! CLI command implementations.

mod agent;
mod config;
mod hn;
mod images;
mod probe;
mod search;
mod weather;

pub use agent::{run_agent, AgentProfile};
pub use config::run_config;
pub use hn::run_hn;
pub use images::run_images;
pub use probe::{probe, run_probe};
pub use search::run_search;
pub use weather::{run_temperature, run_weather};
