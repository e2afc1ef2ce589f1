//! Core library for the city weather service.
//!
//! This crate defines:
//! - The fixed registry of supported cities
//! - The OpenWeather upstream client
//! - SQLite-backed reading history
//! - The service pipelines behind the HTTP API
//! - Configuration handling
//!
//! It is used by `weather-server`, but can also be reused by other binaries.

pub mod city;
pub mod config;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;

pub use city::{City, CityError};
pub use config::Config;
pub use model::{NewReading, StoredReading, WeatherReading};
pub use provider::{ProviderError, WeatherProvider};
pub use service::{ServiceError, WeatherService};
pub use store::{ReadingStore, SqliteReadingStore, StoreError};
