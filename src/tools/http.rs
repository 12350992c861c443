//! HTTP client configuration shared by the tools.

use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

/// User agent sent when a service does not need a browser-like one.
const DEFAULT_USER_AGENT: &str = concat!("palaver/", env!("CARGO_PKG_VERSION"));

/// Create an HTTP client with the given timeout and optional user agent.
pub fn build_client(timeout: Duration, user_agent: Option<&str>) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
        .build()?;
    Ok(client)
}
