use std::{sync::Arc, time::Duration};

use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use skylook_core::{LocationSuggestion, search::DebouncedSearch};
use tokio::runtime::Handle;

/// How long a keystroke may block the prompt waiting for fresh suggestions.
const SUGGESTION_WAIT: Duration = Duration::from_millis(1_500);

/// Feeds keystrokes to the debounced search and offers the suggestions it
/// publishes for them.
///
/// Must be created on the runtime and used from a blocking thread, since
/// each keystroke blocks until the search publishes or the wait runs out.
#[derive(Debug, Clone)]
pub struct LocationCompleter {
    search: Arc<DebouncedSearch>,
    runtime: Handle,
    wait: Duration,
}

impl LocationCompleter {
    pub fn new(search: Arc<DebouncedSearch>) -> Self {
        Self {
            search,
            runtime: Handle::current(),
            wait: SUGGESTION_WAIT,
        }
    }
}

impl Autocomplete for LocationCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let found = self
            .runtime
            .block_on(self.search.submit_and_wait(input, self.wait));
        Ok(found.iter().map(LocationSuggestion::label).collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

/// Map the prompt's answer to the location to look up.
///
/// A chosen suggestion becomes `"name, country"`; free text is used trimmed.
pub fn chosen_query(answer: &str, suggestions: &[LocationSuggestion]) -> String {
    let answer = answer.trim();
    suggestions
        .iter()
        .find(|s| s.label() == answer)
        .map(LocationSuggestion::query)
        .unwrap_or_else(|| answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skylook_core::{
        Coordinates, ForecastReport, GeoMatch, WeatherError, WeatherProvider, WeatherSnapshot,
    };

    /// Answers every geocode with one match named after the query.
    #[derive(Debug)]
    struct EchoProvider;

    #[async_trait]
    impl WeatherProvider for EchoProvider {
        async fn geocode(&self, query: &str, _limit: usize) -> Result<Vec<GeoMatch>, WeatherError> {
            Ok(vec![GeoMatch {
                name: query.to_string(),
                lat: 51.5,
                lon: -0.1,
                country: "GB".into(),
                state: None,
            }])
        }

        async fn current_at(&self, _at: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
            Err(WeatherError::Provider { status: 500 })
        }

        async fn forecast_at(
            &self,
            _at: Coordinates,
            _days: usize,
        ) -> Result<ForecastReport, WeatherError> {
            Err(WeatherError::Provider { status: 500 })
        }
    }

    fn suggestion() -> LocationSuggestion {
        LocationSuggestion::from(GeoMatch {
            name: "Portland".into(),
            lat: 45.5,
            lon: -122.6,
            country: "US".into(),
            state: Some("Oregon".into()),
        })
    }

    #[test]
    fn picked_suggestion_becomes_name_and_country() {
        let query = chosen_query("Portland, Oregon, US", &[suggestion()]);
        assert_eq!(query, "Portland, US");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn keystroke_shows_suggestions_for_what_was_typed() {
        let search = Arc::new(DebouncedSearch::spawn(
            Arc::new(EchoProvider),
            Duration::from_millis(20),
        ));
        let mut completer = LocationCompleter::new(search);
        completer.wait = Duration::from_secs(5);

        let labels = tokio::task::spawn_blocking(move || completer.get_suggestions("London"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(labels, vec!["London, GB".to_string()]);
    }

    #[test]
    fn free_text_is_trimmed() {
        let query = chosen_query("  Portland, ME ", &[suggestion()]);
        assert_eq!(query, "Portland, ME");
    }
}
