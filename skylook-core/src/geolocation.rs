//! Where is the user? Single-shot position lookups.
//!
//! A terminal has no position API, so [`IpGeolocator`] asks an IP geolocation
//! service instead. [`Unsupported`] stands in when geolocation is turned off.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::{Instant, timeout};

use crate::{GeolocationError, model::Coordinates};

pub const DEFAULT_ENDPOINT: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    /// Upper bound for a whole lookup.
    pub timeout: Duration,
    /// A previous fix younger than this is reused.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::from_millis(600_000),
        }
    }
}

#[async_trait]
pub trait Geolocator: Send + Sync + std::fmt::Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Geolocation is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl Geolocator for Unsupported {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::UnsupportedPlatform)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[derive(Debug)]
pub struct IpGeolocator {
    http: Client,
    endpoint: String,
    options: GeolocationOptions,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl IpGeolocator {
    pub fn new(endpoint: &str, options: GeolocationOptions) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.to_string(),
            options,
            last_fix: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<Coordinates> {
        let guard = self.last_fix.lock();
        let (at, coords) = (*guard)?;
        (at.elapsed() <= self.options.maximum_age).then_some(coords)
    }

    async fn lookup(&self) -> Result<Coordinates, GeolocationError> {
        let res = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(%status, "geolocation service refused");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    GeolocationError::PermissionDenied
                }
                _ => GeolocationError::PositionUnavailable,
            });
        }

        let body: IpApiResponse = res.json().await.map_err(transport_error)?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => {
                tracing::debug!(
                    status = %body.status,
                    message = ?body.message,
                    "no position in response"
                );
                Err(GeolocationError::PositionUnavailable)
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> GeolocationError {
    if e.is_timeout() {
        GeolocationError::Timeout
    } else {
        tracing::debug!(error = %e, "geolocation request failed");
        GeolocationError::PositionUnavailable
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        if let Some(coords) = self.cached() {
            tracing::debug!(%coords, "using cached position");
            return Ok(coords);
        }

        let coords = timeout(self.options.timeout, self.lookup())
            .await
            .map_err(|_| GeolocationError::Timeout)??;

        tracing::info!(%coords, "geolocation successful");
        *self.last_fix.lock() = Some((Instant::now(), coords));
        Ok(coords)
    }
}
