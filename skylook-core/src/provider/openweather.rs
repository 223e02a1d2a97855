use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    WeatherError,
    forecast::{ForecastStep, group_by_day},
    model::{
        Condition, Coordinates, CurrentConditions, ForecastReport, GeoMatch, LocationInfo,
        WeatherSnapshot,
    },
    units::{celsius_to_fahrenheit, mps_to_kph, mps_to_mph},
};

use super::WeatherProvider;

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";
const ICON_URL: &str = "https://openweathermap.org/img/wn";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    weather_url: String,
    geo_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoints(api_key, DEFAULT_WEATHER_URL, DEFAULT_GEO_URL)
    }

    /// Point the provider at alternative base URLs (proxies, mock servers).
    pub fn with_endpoints(api_key: String, weather_url: &str, geo_url: &str) -> Self {
        Self {
            api_key,
            http: Client::new(),
            weather_url: weather_url.trim_end_matches('/').to_string(),
            geo_url: geo_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        tracing::debug!(url, "OpenWeather request");

        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(WeatherError::Provider {
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))
    }

    fn coordinate_query(at: Coordinates) -> [(&'static str, String); 3] {
        [
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("units", "metric".to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    pressure: Option<f64>,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: Option<u32>,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    /// Shift from UTC in seconds.
    #[serde(default)]
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn condition(weather: &[OwWeather]) -> Condition {
    match weather.first() {
        Some(w) => Condition {
            text: w.description.clone(),
            icon: format!("{ICON_URL}/{}@2x.png", w.icon),
            code: w.id,
        },
        None => Condition {
            text: "Unknown".to_string(),
            icon: String::new(),
            code: None,
        },
    }
}

fn conditions(main: &OwMain, weather: &[OwWeather], wind: &OwWind) -> CurrentConditions {
    CurrentConditions {
        temp_c: main.temp,
        temp_f: celsius_to_fahrenheit(main.temp),
        condition: condition(weather),
        humidity: main.humidity,
        pressure_mb: main.pressure,
        wind_kph: mps_to_kph(wind.speed),
        wind_mph: mps_to_mph(wind.speed),
        uv: 0.0,
        feels_like_c: main.feels_like,
        feels_like_f: celsius_to_fahrenheit(main.feels_like),
    }
}

fn snapshot_from_current(parsed: OwCurrentResponse, now: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        location: LocationInfo {
            name: parsed.name,
            country: parsed.sys.country,
            localtime: now,
        },
        current: conditions(&parsed.main, &parsed.weather, &parsed.wind),
    }
}

fn report_from_forecast(
    parsed: OwForecastResponse,
    days: usize,
    now: DateTime<Utc>,
) -> Result<ForecastReport, WeatherError> {
    let first = parsed
        .list
        .first()
        .ok_or_else(|| WeatherError::InvalidResponse("forecast contained no data".to_string()))?;

    let snapshot = WeatherSnapshot {
        location: LocationInfo {
            name: parsed.city.name.clone(),
            country: parsed.city.country.clone(),
            localtime: now,
        },
        current: conditions(&first.main, &first.weather, &first.wind),
    };

    let offset = parsed
        .city
        .timezone
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());

    let steps: Vec<ForecastStep> = parsed
        .list
        .iter()
        .map(|e| ForecastStep {
            dt: e.dt,
            temp_min_c: e.main.temp_min.unwrap_or(e.main.temp),
            temp_max_c: e.main.temp_max.unwrap_or(e.main.temp),
            condition: condition(&e.weather),
            pop: e.pop,
        })
        .collect();

    Ok(ForecastReport {
        snapshot,
        days: group_by_day(&steps, offset, days),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<GeoMatch>, WeatherError> {
        let url = format!("{}/direct", self.geo_url);
        self.get_json(
            &url,
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn current_at(&self, at: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/weather", self.weather_url);
        let parsed: OwCurrentResponse = self.get_json(&url, &Self::coordinate_query(at)).await?;
        Ok(snapshot_from_current(parsed, Utc::now()))
    }

    async fn forecast_at(
        &self,
        at: Coordinates,
        days: usize,
    ) -> Result<ForecastReport, WeatherError> {
        let url = format!("{}/forecast", self.weather_url);
        let parsed: OwForecastResponse = self.get_json(&url, &Self::coordinate_query(at)).await?;
        report_from_forecast(parsed, days, Utc::now())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
