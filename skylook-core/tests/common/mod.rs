//! In-memory doubles shared by the integration tests.

#![allow(dead_code)]

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use skylook_core::{
    Coordinates, ForecastDay, ForecastReport, GeoMatch, GeolocationError, WeatherError,
    WeatherProvider, WeatherSnapshot,
    geolocation::Geolocator,
    model::{Condition, CurrentConditions, LocationInfo},
    units::celsius_to_fahrenheit,
};

pub fn geo(name: &str, country: &str, lat: f64, lon: f64) -> GeoMatch {
    GeoMatch {
        name: name.to_string(),
        lat,
        lon,
        country: country.to_string(),
        state: None,
    }
}

pub fn london() -> GeoMatch {
    geo("London", "GB", 51.5, -0.1)
}

pub fn snapshot(name: &str, country: &str, temp_c: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        location: LocationInfo {
            name: name.to_string(),
            country: country.to_string(),
            localtime: Utc::now(),
        },
        current: CurrentConditions {
            temp_c,
            temp_f: celsius_to_fahrenheit(temp_c),
            condition: Condition {
                text: "clear sky".to_string(),
                icon: String::new(),
                code: Some(800),
            },
            humidity: 50,
            pressure_mb: None,
            wind_kph: 10.0,
            wind_mph: 6.2,
            uv: 0.0,
            feels_like_c: temp_c,
            feels_like_f: celsius_to_fahrenheit(temp_c),
        },
    }
}

/// Scripted provider that records every call it receives.
#[derive(Debug, Default)]
pub struct StubProvider {
    responses: HashMap<String, Vec<GeoMatch>>,
    delays: HashMap<String, Duration>,
    geocode_status: Option<u16>,
    weather_status: Option<u16>,
    geocodes: Mutex<Vec<(String, usize)>>,
    fetches: Mutex<Vec<Coordinates>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, query: &str, matches: Vec<GeoMatch>) -> Self {
        self.responses.insert(query.to_string(), matches);
        self
    }

    pub fn delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn fail_geocode(mut self, status: u16) -> Self {
        self.geocode_status = Some(status);
        self
    }

    pub fn fail_weather(mut self, status: u16) -> Self {
        self.weather_status = Some(status);
        self
    }

    pub fn geocode_queries(&self) -> Vec<String> {
        self.geocodes.lock().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn geocode_limits(&self) -> Vec<usize> {
        self.geocodes.lock().iter().map(|(_, l)| *l).collect()
    }

    pub fn fetched_at(&self) -> Vec<Coordinates> {
        self.fetches.lock().clone()
    }

    fn place_at(&self, at: Coordinates) -> (String, String) {
        self.responses
            .values()
            .flatten()
            .find(|m| m.coordinates() == at)
            .map(|m| (m.name.clone(), m.country.clone()))
            .unwrap_or_else(|| ("Current Location".to_string(), String::new()))
    }

    fn record_fetch(&self, at: Coordinates) -> Result<(), WeatherError> {
        self.fetches.lock().push(at);
        match self.weather_status {
            Some(status) => Err(WeatherError::Provider { status }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<GeoMatch>, WeatherError> {
        self.geocodes.lock().push((query.to_string(), limit));

        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(status) = self.geocode_status {
            return Err(WeatherError::Provider { status });
        }
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }

    async fn current_at(&self, at: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        self.record_fetch(at)?;
        let (name, country) = self.place_at(at);
        Ok(snapshot(&name, &country, 18.0))
    }

    async fn forecast_at(
        &self,
        at: Coordinates,
        days: usize,
    ) -> Result<ForecastReport, WeatherError> {
        self.record_fetch(at)?;
        let (name, country) = self.place_at(at);
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date");

        let days = (0..days as u64)
            .map(|i| ForecastDay {
                date: start + chrono::Days::new(i),
                maxtemp_c: 20.0,
                maxtemp_f: 68.0,
                mintemp_c: 10.0,
                mintemp_f: 50.0,
                condition: snapshot(&name, &country, 15.0).current.condition,
                chance_of_rain: 0,
            })
            .collect();

        Ok(ForecastReport {
            snapshot: snapshot(&name, &country, 15.0),
            days,
        })
    }
}

#[derive(Debug)]
pub struct StubGeolocator {
    result: Result<Coordinates, GeolocationError>,
}

impl StubGeolocator {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            result: Ok(Coordinates::new(lat, lon)),
        }
    }

    pub fn failing(err: GeolocationError) -> Self {
        Self { result: Err(err) }
    }
}

#[async_trait]
impl Geolocator for StubGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.result
    }
}
