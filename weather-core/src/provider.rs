use crate::{City, Config, NewReading, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Failures while fetching a reading from the upstream provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("Provider returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The provider could not be reached or the response could not be read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered successfully with a payload we can't use.
    #[error("Unexpected provider payload: {0}")]
    Decode(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the current conditions for `city`.
    async fn fetch_current(&self, city: City) -> Result<NewReading, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: set OPENWEATHER_API_KEY or add `openweather_api_key` to the config file."
        )
    })?;

    let provider =
        OpenWeatherProvider::with_base_url(api_key.to_owned(), &config.openweather_base_url)?;

    Ok(Box::new(provider))
}
