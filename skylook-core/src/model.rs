use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::units::TemperatureUnit;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Recognize a `"lat,lon"` query, e.g. one produced by geolocation.
    pub fn parse(query: &str) -> Option<Self> {
        let (lat, lon) = query.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;

        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);

        valid.then_some(Self { lat, lon })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// One geocoding candidate as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl GeoMatch {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub country: String,
    pub localtime: DateTime<Utc>,
}

/// Current conditions with every temperature and speed in both units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub humidity: u8,
    pub pressure_mb: Option<f64>,
    pub wind_kph: f64,
    pub wind_mph: f64,
    /// Not provided by the basic endpoints; always 0.
    pub uv: f64,
    pub feels_like_c: f64,
    pub feels_like_f: f64,
}

/// One fetched, non-cached weather result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: LocationInfo,
    pub current: CurrentConditions,
}

/// Aggregate of all forecast time-steps that fall on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub condition: Condition,
    pub chance_of_rain: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub snapshot: WeatherSnapshot,
    pub days: Vec<ForecastDay>,
}

/// Autocomplete candidate. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub id: String,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl LocationSuggestion {
    /// The location string submitted when this suggestion is chosen.
    pub fn query(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    pub fn label(&self) -> String {
        if self.region.is_empty() {
            format!("{}, {}", self.name, self.country)
        } else {
            format!("{}, {}, {}", self.name, self.region, self.country)
        }
    }
}

impl From<GeoMatch> for LocationSuggestion {
    fn from(m: GeoMatch) -> Self {
        Self {
            id: format!("{}-{}", m.lat, m.lon),
            name: m.name,
            region: m.state.unwrap_or_default(),
            country: m.country,
            lat: m.lat,
            lon: m.lon,
        }
    }
}

pub const DEFAULT_LAST_SEARCHED: &str = "London";

/// Persisted user settings. One document, always replaced whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub unit: TemperatureUnit,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(rename = "lastSearched", default = "default_last_searched")]
    pub last_searched: String,
}

fn default_last_searched() -> String {
    DEFAULT_LAST_SEARCHED.to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::Celsius,
            favorites: Vec::new(),
            last_searched: default_last_searched(),
        }
    }
}

impl UserPreferences {
    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.iter().any(|f| f == name)
    }

    /// Collapse repeated favorites, keeping first-seen order.
    pub(crate) fn dedup_favorites(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.favorites.retain(|f| seen.insert(f.clone()));
    }
}
