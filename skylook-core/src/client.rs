//! Location-string level weather lookups.

use std::sync::Arc;

use crate::{
    WeatherError,
    model::{Coordinates, ForecastReport, WeatherSnapshot},
    provider::WeatherProvider,
};

pub const DEFAULT_FORECAST_DAYS: usize = 5;

/// Resolves free-text locations and fetches weather for them.
///
/// Every call is a fresh round trip; nothing is cached.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherClient {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.provider)
    }

    /// Turn a location query into coordinates.
    ///
    /// `"lat,lon"` queries are used directly; anything else is geocoded and
    /// the single best match is taken.
    pub async fn resolve(&self, query: &str) -> Result<Coordinates, WeatherError> {
        if let Some(at) = Coordinates::parse(query) {
            tracing::debug!(%at, "query is already a coordinate pair");
            return Ok(at);
        }

        let best = self
            .provider
            .geocode(query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(WeatherError::LocationNotFound)?;

        tracing::debug!(query, name = %best.name, lat = best.lat, lon = best.lon, "geocoded");
        Ok(best.coordinates())
    }

    pub async fn fetch_current(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
        let at = self.resolve(query).await?;
        self.provider.current_at(at).await
    }

    pub async fn fetch_forecast(
        &self,
        query: &str,
        days: usize,
    ) -> Result<ForecastReport, WeatherError> {
        let at = self.resolve(query).await?;
        self.provider.forecast_at(at, days).await
    }
}
