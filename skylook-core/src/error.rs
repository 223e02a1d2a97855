//! Typed failures surfaced by the core library.
//!
//! `Display` output is meant to be shown to the user as-is.

use thiserror::Error;

/// Failures of the weather data client.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Geocoding returned zero candidates.
    #[error("Location not found")]
    LocationNotFound,

    /// The provider answered with a non-success HTTP status.
    #[error("Weather API error: {status}")]
    Provider { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from weather provider: {0}")]
    InvalidResponse(String),
}

/// Failures of the geolocation resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported on this platform")]
    UnsupportedPlatform,

    #[error("Location access denied by user")]
    PermissionDenied,

    #[error("Location information unavailable")]
    PositionUnavailable,

    #[error("Location request timed out")]
    Timeout,
}

/// Failures of the key-value storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),
}
