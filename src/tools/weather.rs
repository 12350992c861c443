//! Weather tools backed by wttr.in.

use super::args::{decode_args, lenient_opt_uint};
use super::http::build_client;
use super::ToolId;
use crate::agent::Tool;
use crate::config::WeatherSettings;
use crate::error::{PalaverError, Result};
use crate::llm::{ParamKind, ToolDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// wttr.in one-line format for current conditions.
const CURRENT_FORMAT: &str = "%l:+%C,+%t,+humidity:+%h,+wind:+%w";

/// Client for the wttr.in text and JSON formats.
pub struct WeatherClient {
    http: Client,
    base_url: Url,
    max_days: u32,
}

impl WeatherClient {
    pub fn new(settings: &WeatherSettings) -> Result<Self> {
        Ok(Self {
            http: build_client(Duration::from_secs(settings.timeout_secs), None)?,
            base_url: Url::parse(&settings.base_url)?,
            max_days: settings.max_forecast_days.max(1),
        })
    }

    fn url(&self, city: &str, format: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PalaverError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(city);
        // wttr.in format codes must reach the server unencoded.
        url.set_query(Some(&format!("format={}", format)));
        Ok(url)
    }

    async fn fetch_text(&self, city: &str, format: &str) -> Result<String> {
        let url = self.url(city, format)?;
        debug!("GET {}", url);
        let text = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text.trim().to_string())
    }

    /// Current temperature, e.g. `+18°C`.
    #[instrument(skip(self))]
    pub async fn temperature(&self, city: &str) -> Result<String> {
        self.fetch_text(city, "%t").await
    }

    /// One line with location, conditions, temperature, humidity and wind.
    #[instrument(skip(self))]
    pub async fn current(&self, city: &str) -> Result<String> {
        self.fetch_text(city, CURRENT_FORMAT).await
    }

    /// Daily forecast for `days` days, clamped to what the service provides.
    #[instrument(skip(self))]
    pub async fn forecast(&self, city: &str, days: u32) -> Result<String> {
        let days = days.clamp(1, self.max_days) as usize;
        let url = self.url(city, "j1")?;
        let data: ForecastResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut lines = vec![format!("Weather forecast for {}:", city)];
        for day in data.weather.iter().take(days) {
            lines.push(format!(
                "  {}: {}, {}°C - {}°C",
                day.date,
                day.condition(),
                day.min_temp,
                day.max_temp
            ));
        }
        Ok(lines.join("\n"))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    weather: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    #[serde(default = "unknown")]
    date: String,
    #[serde(rename = "maxtempC", default = "question_mark")]
    max_temp: String,
    #[serde(rename = "mintempC", default = "question_mark")]
    min_temp: String,
    #[serde(default)]
    hourly: Vec<Hourly>,
}

impl ForecastDay {
    /// Conditions at the middle of the day.
    fn condition(&self) -> &str {
        self.hourly
            .get(self.hourly.len() / 2)
            .and_then(|h| h.weather_desc.first())
            .map(|d| d.value.as_str())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Deserialize)]
struct Hourly {
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<Description>,
}

#[derive(Debug, Deserialize)]
struct Description {
    value: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn question_mark() -> String {
    "?".to_string()
}

#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
}

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    city: String,
    #[serde(default, deserialize_with = "lenient_opt_uint")]
    days: Option<u32>,
}

fn require_city(tool: ToolId, city: &str) -> Result<()> {
    if city.trim().is_empty() {
        return Err(PalaverError::InvalidArguments {
            tool: tool.to_string(),
            reason: "city must not be empty".to_string(),
        });
    }
    Ok(())
}

/// One of the weather tools, sharing a client.
pub struct WeatherTool {
    id: ToolId,
    descriptor: ToolDescriptor,
    client: Arc<WeatherClient>,
}

impl WeatherTool {
    pub fn temperature(client: Arc<WeatherClient>) -> Self {
        Self {
            id: ToolId::GetTemperature,
            descriptor: ToolDescriptor::new(
                ToolId::GetTemperature.as_str(),
                "Get the current temperature for a city",
            )
            .required("city", ParamKind::String, "The name of the city"),
            client,
        }
    }

    pub fn current(client: Arc<WeatherClient>) -> Self {
        Self {
            id: ToolId::GetWeather,
            descriptor: ToolDescriptor::new(
                ToolId::GetWeather.as_str(),
                "Get the current weather for a city including temperature, conditions, humidity and wind",
            )
            .required("city", ParamKind::String, "The name of the city"),
            client,
        }
    }

    pub fn forecast(client: Arc<WeatherClient>) -> Self {
        Self {
            id: ToolId::GetWeatherForecast,
            descriptor: ToolDescriptor::new(
                ToolId::GetWeatherForecast.as_str(),
                "Get weather forecast for a city for the next days",
            )
            .required("city", ParamKind::String, "The name of the city")
            .optional(
                "days",
                ParamKind::Integer,
                "Number of days to forecast (1-3), defaults to 3",
            ),
            client,
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn id(&self) -> ToolId {
        self.id
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn error_context(&self) -> &'static str {
        match self.id {
            ToolId::GetTemperature => "fetching temperature",
            ToolId::GetWeatherForecast => "fetching forecast",
            _ => "fetching weather",
        }
    }

    async fn call(&self, arguments: &Value) -> Result<String> {
        match self.id {
            ToolId::GetWeatherForecast => {
                let args: ForecastArgs = decode_args(self.id, arguments)?;
                require_city(self.id, &args.city)?;
                self.client.forecast(&args.city, args.days.unwrap_or(3)).await
            }
            ToolId::GetTemperature => {
                let args: CityArgs = decode_args(self.id, arguments)?;
                require_city(self.id, &args.city)?;
                self.client.temperature(&args.city).await
            }
            _ => {
                let args: CityArgs = decode_args(self.id, arguments)?;
                require_city(self.id, &args.city)?;
                self.client.current(&args.city).await
            }
        }
    }
}
