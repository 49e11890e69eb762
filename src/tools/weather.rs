//! Current-weather lookup over WeatherAPI
//!
//! Information Hiding:
//! - HTTP client and response shape hidden
//! - Missing API key disables the tool instead of failing calls

use super::{parse_args, Tool, ToolError, ToolMetadata};
use crate::config::WeatherConfig;
use crate::tool_metadata;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::{timeout, Duration};

#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

pub struct WeatherTool {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl WeatherTool {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
            timeout_secs,
        }
    }

    pub fn from_config(config: &WeatherConfig, api_key: Option<String>) -> Self {
        Self::new(config.base_url.clone(), api_key, config.timeout_secs)
    }

    async fn fetch(&self, city: &str, api_key: &str) -> Result<CurrentWeather, ToolError> {
        let url = format!("{}/v1/current.json", self.base_url.trim_end_matches('/'));
        tracing::info!("Fetching weather for {}", city);

        let response = self
            .client
            .get(url)
            .query(&[("key", api_key), ("q", city), ("aqi", "no")])
            .send()
            .await
            .map_err(|e| ToolError::Upstream(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(ToolError::NotFound(format!(
                "no weather for '{}' (HTTP {})",
                city, status
            )));
        }
        if !status.is_success() {
            return Err(ToolError::Upstream(format!("HTTP {}", status)));
        }

        response
            .json::<CurrentWeather>()
            .await
            .map_err(|e| ToolError::Upstream(e.to_string()))
    }
}

#[async_trait]
impl<C: Send + Sync + 'static> Tool<C> for WeatherTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "get_weather",
            description: "Fetch real current weather info for a city.",
            parameters: [
                {
                    name: "city",
                    type: "string",
                    description: "City name, e.g. Karachi",
                    required: true
                }
            ]
        }
    }

    fn is_enabled(&self, _ctx: &C) -> bool {
        self.api_key.is_some()
    }

    fn validate(&self, args: &Value) -> Result<(), ToolError> {
        match args["city"].as_str() {
            Some(city) if !city.trim().is_empty() => Ok(()),
            _ => Err(ToolError::InvalidArguments(
                "'city' parameter is required and must be a non-empty string".into(),
            )),
        }
    }

    async fn execute(&self, args: Value, _ctx: &C) -> Result<String, ToolError> {
        let CityArgs { city } = parse_args(args)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::Disabled("get_weather".into()))?;

        let weather = match timeout(
            Duration::from_secs(self.timeout_secs),
            self.fetch(city.trim(), api_key),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(ToolError::Timeout(self.timeout_secs)),
        };

        Ok(format!(
            "The weather in {}, {} is {:.1}°C with {}.",
            weather.location.name,
            weather.location.country,
            weather.current.temp_c,
            weather.current.condition.text
        ))
    }

    fn on_failure(&self, _error: &ToolError) -> String {
        "Sorry, I could not fetch the weather for that city right now.".to_string()
    }
}
