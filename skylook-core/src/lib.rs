//! Core library for the `skylook` weather client.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather provider and the location-level weather client
//! - Forecast normalization and unit conversion
//! - Location search with a debounced worker
//! - Geolocation, persisted preferences and the lookup state machine
//!
//! It is used by `skylook-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod search;
pub mod session;
pub mod store;
pub mod units;

pub use client::WeatherClient;
pub use config::Config;
pub use error::{GeolocationError, StoreError, WeatherError};
pub use model::{
    Coordinates, ForecastDay, ForecastReport, GeoMatch, LocationSuggestion, UserPreferences,
    WeatherSnapshot,
};
pub use provider::WeatherProvider;
pub use session::{ViewState, WeatherSession};
pub use units::TemperatureUnit;
