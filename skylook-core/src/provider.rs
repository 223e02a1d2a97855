use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    WeatherError,
    model::{Coordinates, ForecastReport, GeoMatch, WeatherSnapshot},
};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Raw access to a weather service: geocoding plus weather at coordinates.
///
/// Implementations normalize the service's payloads into the crate's models.
/// Query-level behavior (resolving names, search limits) lives in
/// [`crate::client::WeatherClient`] and [`crate::search`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Candidates for a free-text place name, best match first.
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<GeoMatch>, WeatherError>;

    async fn current_at(&self, at: Coordinates) -> Result<WeatherSnapshot, WeatherError>;

    /// Current conditions plus up to `days` daily aggregates.
    async fn forecast_at(
        &self,
        at: Coordinates,
        days: usize,
    ) -> Result<ForecastReport, WeatherError>;
}
