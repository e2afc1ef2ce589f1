//! Request pipelines behind the HTTP API.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::{
    City, CityError, WeatherReading,
    provider::{ProviderError, WeatherProvider},
    store::{DEFAULT_HISTORY_LIMIT, ReadingStore},
};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidCity(#[from] CityError),

    #[error("Upstream provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Carries detail for logs only; callers see a generic message.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status to answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCity(_) => 400,
            Self::Upstream { status, .. } if (400..=599).contains(status) => *status,
            Self::Upstream { .. } => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Message safe to show to API clients.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCity(e) => e.to_string(),
            Self::Upstream { message, .. } => message.clone(),
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<ProviderError> for ServiceError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Upstream { status, message } => Self::Upstream { status, message },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Store calls run on tokio's blocking pool, off the async workers.
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn ReadingStore>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn ReadingStore>) -> Self {
        Self { provider, store }
    }

    /// Fetch, persist and return the current reading for `raw_city`.
    #[instrument(skip(self), level = "info")]
    pub async fn get_current(&self, raw_city: &str) -> Result<WeatherReading, ServiceError> {
        let city = City::try_from(raw_city)?;

        let reading = self.provider.fetch_current(city).await.map_err(|e| {
            match &e {
                ProviderError::Upstream { .. } => warn!(%city, "Provider rejected request: {e}"),
                _ => error!(%city, "Error fetching weather: {e}"),
            }
            ServiceError::from(e)
        })?;

        let store = self.store.clone();
        let stored = tokio::task::spawn_blocking(move || store.save(reading))
            .await
            .map_err(|e| ServiceError::Internal(format!("store task failed: {e}")))?
            .map_err(|e| {
                error!(%city, "Error saving reading: {e}");
                ServiceError::Internal(e.to_string())
            })?;

        info!(%city, id = stored.id, "Stored current reading");
        Ok(stored.reading)
    }

    /// The most recent readings for `raw_city`, newest first.
    #[instrument(skip(self), level = "info")]
    pub async fn get_history(&self, raw_city: &str) -> Result<Vec<WeatherReading>, ServiceError> {
        let city = City::try_from(raw_city)?;

        let store = self.store.clone();
        let history =
            tokio::task::spawn_blocking(move || store.history(city, DEFAULT_HISTORY_LIMIT))
                .await
                .map_err(|e| ServiceError::Internal(format!("store task failed: {e}")))?
                .map_err(|e| {
                    error!(%city, "Error fetching history: {e}");
                    ServiceError::Internal(e.to_string())
                })?;

        Ok(history.into_iter().map(|stored| stored.reading).collect())
    }
}
