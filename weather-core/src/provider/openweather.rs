use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    City, NewReading,
    model::round_tenth,
    provider::{ProviderError, WeatherProvider},
};

/// Every supported city is in Germany.
const COUNTRY_CODE: &str = "DE";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_ERROR_MESSAGE: &str = "Failed to fetch weather data";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// `base_url` is the API root, e.g. `https://api.openweathermap.org`.
    pub fn with_base_url(api_key: String, base_url: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwErrorResponse {
    message: Option<String>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch_current(&self, city: City) -> Result<NewReading, ProviderError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let query = format!("{},{}", city.as_str(), COUNTRY_CODE);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let status = res.status();
        let body = res.text().await.map_err(network_error)?;

        if !status.is_success() {
            let message = upstream_message(&body);
            warn!(status = status.as_u16(), %message, "OpenWeather request failed");
            return Err(ProviderError::Upstream { status: status.as_u16(), message });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Decode(format!("invalid current weather JSON: {e}")))?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("empty weather condition list".to_string()))?;

        debug!(temp = parsed.main.temp, wind = parsed.wind.speed, "OpenWeather response parsed");

        Ok(NewReading {
            city,
            temperature: round_tenth(parsed.main.temp),
            description: condition.description,
            humidity: parsed.main.humidity,
            wind_speed: round_tenth(parsed.wind.speed),
            icon: condition.icon,
            timestamp: Some(Utc::now()),
        })
    }
}

/// The request URL carries the API key in its query string; drop it.
fn network_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Network(err.without_url())
}

/// Pull the provider's `message` out of an error body, or fall back to a generic one.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<OwErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}
