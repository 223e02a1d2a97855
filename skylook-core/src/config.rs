use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    client::{DEFAULT_FORECAST_DAYS, WeatherClient},
    geolocation::{self, GeolocationOptions, Geolocator, IpGeolocator, Unsupported},
    provider::{
        OpenWeatherProvider,
        openweather::{DEFAULT_GEO_URL, DEFAULT_WEATHER_URL},
    },
    store::FileStore,
};

/// Base URLs of the OpenWeather APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub weather_url: String,
    pub geo_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            geo_url: DEFAULT_GEO_URL.to_string(),
        }
    }
}

/// Missing keys fall back to [`GeolocationOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        let opts = GeolocationOptions::default();
        Self {
            enabled: true,
            endpoint: geolocation::DEFAULT_ENDPOINT.to_string(),
            timeout_ms: opts.timeout.as_millis() as u64,
            maximum_age_ms: opts.maximum_age.as_millis() as u64,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    #[serde(default = "default_forecast_days")]
    pub forecast_days: usize,

    /// Example TOML:
    /// [endpoints]
    /// weather_url = "https://api.openweathermap.org/data/2.5"
    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

fn default_forecast_days() -> usize {
    DEFAULT_FORECAST_DAYS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            forecast_days: DEFAULT_FORECAST_DAYS,
            endpoints: Endpoints::default(),
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Config {
    /// Return the API key, or an error with a hint on how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `skylook configure` and enter your API key."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skylook", "skylook")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted preferences.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn preference_backend() -> Result<FileStore> {
        Ok(FileStore::new(Self::data_dir()?))
    }

    /// Build the weather client from the configured key and endpoints.
    pub fn weather_client(&self) -> Result<WeatherClient> {
        let provider = OpenWeatherProvider::with_endpoints(
            self.api_key()?.to_owned(),
            &self.endpoints.weather_url,
            &self.endpoints.geo_url,
        );
        Ok(WeatherClient::new(Arc::new(provider)))
    }

    pub fn geolocator(&self) -> Box<dyn Geolocator> {
        let geo = &self.geolocation;
        if !geo.enabled {
            return Box::new(Unsupported);
        }

        let options = GeolocationOptions {
            timeout: Duration::from_millis(geo.timeout_ms),
            maximum_age: Duration::from_millis(geo.maximum_age_ms),
        };
        Box::new(IpGeolocator::new(&geo.endpoint, options))
    }
}
