//! Lookup state machine behind the user-facing views.
//!
//! `Idle -> Loading -> (Success | Failure)`, with preference mutations applied
//! synchronously alongside it.

use crate::{
    GeolocationError,
    client::WeatherClient,
    geolocation::Geolocator,
    model::{ForecastDay, UserPreferences, WeatherSnapshot},
    store::{KeyValueStore, PreferenceStore},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading,
    Success {
        snapshot: WeatherSnapshot,
        forecast: Option<Vec<ForecastDay>>,
    },
    Failure(String),
}

impl ViewState {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            ViewState::Success { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failure(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupMode {
    Current,
    Forecast { days: usize },
}

/// Owns the data client, the geolocator and the preference store, and is the
/// single place that turns their results into view state.
#[derive(Debug)]
pub struct WeatherSession<S> {
    client: WeatherClient,
    geolocator: Box<dyn Geolocator>,
    store: PreferenceStore<S>,
    preferences: UserPreferences,
    state: ViewState,
    last_attempted: Option<String>,
    mode: LookupMode,
}

impl<S: KeyValueStore> WeatherSession<S> {
    pub fn new(
        client: WeatherClient,
        geolocator: Box<dyn Geolocator>,
        store: PreferenceStore<S>,
    ) -> Self {
        let preferences = store.get();
        Self {
            client,
            geolocator,
            store,
            preferences,
            state: ViewState::Idle,
            last_attempted: None,
            mode: LookupMode::Current,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn client(&self) -> &WeatherClient {
        &self.client
    }

    /// Location a retry would use.
    pub fn retry_location(&self) -> &str {
        self.last_attempted
            .as_deref()
            .unwrap_or(&self.preferences.last_searched)
    }

    fn begin(&mut self, location: &str, mode: LookupMode) {
        tracing::info!(location, ?mode, "loading weather");
        self.state = ViewState::Loading;
        self.last_attempted = Some(location.to_string());
        self.mode = mode;
    }

    fn finish(
        &mut self,
        location: &str,
        result: Result<ViewState, crate::WeatherError>,
    ) -> &ViewState {
        self.state = match result {
            Ok(state) => {
                self.preferences = self.store.set_last_searched(location);
                state
            }
            Err(e) => {
                tracing::warn!(location, error = %e, "weather lookup failed");
                ViewState::Failure(e.to_string())
            }
        };
        &self.state
    }

    /// Fetch current conditions for `location`.
    pub async fn load(&mut self, location: &str) -> &ViewState {
        self.begin(location, LookupMode::Current);
        let result = self
            .client
            .fetch_current(location)
            .await
            .map(|snapshot| ViewState::Success {
                snapshot,
                forecast: None,
            });
        self.finish(location, result)
    }

    /// Fetch current conditions plus a `days`-day forecast for `location`.
    pub async fn load_forecast(&mut self, location: &str, days: usize) -> &ViewState {
        self.begin(location, LookupMode::Forecast { days });
        let result = self
            .client
            .fetch_forecast(location, days)
            .await
            .map(|report| ViewState::Success {
                snapshot: report.snapshot,
                forecast: Some(report.days),
            });
        self.finish(location, result)
    }

    /// Repeat the last lookup, or load the persisted location if none was made.
    pub async fn retry(&mut self) -> &ViewState {
        let location = self.retry_location().to_string();
        match self.mode {
            LookupMode::Current => self.load(&location).await,
            LookupMode::Forecast { days } => self.load_forecast(&location, days).await,
        }
    }

    /// Load weather at the device position.
    ///
    /// When the position cannot be determined the last searched location is
    /// loaded instead and the geolocation error is returned for display.
    pub async fn use_current_location(&mut self) -> Option<GeolocationError> {
        match self.geolocator.current_position().await {
            Ok(at) => {
                let location = at.to_string();
                self.reload_in_mode(&location).await;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "falling back to last searched location");
                let location = self.preferences.last_searched.clone();
                self.reload_in_mode(&location).await;
                Some(e)
            }
        }
    }

    async fn reload_in_mode(&mut self, location: &str) {
        match self.mode {
            LookupMode::Current => self.load(location).await,
            LookupMode::Forecast { days } => self.load_forecast(location, days).await,
        };
    }

    /// Make subsequent geolocation and retry lookups include a forecast.
    pub fn prefer_forecast(&mut self, days: usize) {
        self.mode = LookupMode::Forecast { days };
    }

    pub fn toggle_unit(&mut self) -> &UserPreferences {
        self.preferences = self.store.toggle_unit();
        &self.preferences
    }

    pub fn add_favorite(&mut self, name: &str) -> &UserPreferences {
        self.preferences = self.store.add_favorite(name);
        &self.preferences
    }

    pub fn remove_favorite(&mut self, name: &str) -> &UserPreferences {
        self.preferences = self.store.remove_favorite(name);
        &self.preferences
    }

    pub fn toggle_favorite(&mut self, name: &str) -> &UserPreferences {
        self.preferences = self.store.toggle_favorite(name);
        &self.preferences
    }

    /// Whether the location currently shown is a favorite.
    pub fn showing_favorite(&self) -> bool {
        self.state
            .snapshot()
            .is_some_and(|s| self.preferences.is_favorite(&s.location.name))
    }
}
