//! Autocomplete lookups for partially typed location names.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{sleep, timeout},
};

use crate::{model::LocationSuggestion, provider::WeatherProvider};

/// Shorter queries never reach the network.
pub const MIN_QUERY_CHARS: usize = 3;
pub const MAX_SUGGESTIONS: usize = 5;
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Candidate locations for `query`, in provider order.
///
/// Provider failures degrade to an empty list.
pub async fn search_locations(
    provider: &dyn WeatherProvider,
    query: &str,
) -> Vec<LocationSuggestion> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    match provider.geocode(query, MAX_SUGGESTIONS).await {
        Ok(matches) => matches
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(LocationSuggestion::from)
            .collect(),
        Err(e) => {
            tracing::warn!(query, error = %e, "location search failed");
            Vec::new()
        }
    }
}

/// Search-as-you-type worker.
///
/// Each [`submit`](Self::submit) restarts the quiet timer. Once input has been
/// quiet for the configured interval the latest query is searched. Searches
/// already in flight are not cancelled and publish whenever they finish, so an
/// older, slower response can replace a newer one.
#[derive(Debug)]
pub struct DebouncedSearch {
    input: watch::Sender<String>,
    results: watch::Receiver<Vec<LocationSuggestion>>,
    worker: JoinHandle<()>,
}

impl DebouncedSearch {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(provider: Arc<dyn WeatherProvider>, quiet: Duration) -> Self {
        let (input, input_rx) = watch::channel(String::new());
        let (results_tx, results) = watch::channel(Vec::new());
        let worker = tokio::spawn(run(provider, quiet, input_rx, Arc::new(results_tx)));

        Self {
            input,
            results,
            worker,
        }
    }

    pub fn submit(&self, query: &str) {
        self.input.send_replace(query.to_string());
    }

    /// Submit `query` and wait up to `limit` for the next publish.
    ///
    /// Returns the latest suggestions either way. The next publish is usually
    /// the one for `query`, unless an older search is still in flight.
    pub async fn submit_and_wait(&self, query: &str, limit: Duration) -> Vec<LocationSuggestion> {
        let mut published = self.results.clone();
        published.borrow_and_update();
        self.submit(query);

        if timeout(limit, published.changed()).await.is_err() {
            tracing::debug!(query, "no suggestions published in time");
        }
        self.latest()
    }

    /// Most recently published suggestions.
    pub fn latest(&self) -> Vec<LocationSuggestion> {
        self.results.borrow().clone()
    }

    /// A receiver notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Vec<LocationSuggestion>> {
        self.results.clone()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run(
    provider: Arc<dyn WeatherProvider>,
    quiet: Duration,
    mut input: watch::Receiver<String>,
    results: Arc<watch::Sender<Vec<LocationSuggestion>>>,
) {
    let mut pending: Option<String> = None;

    loop {
        tokio::select! {
            changed = input.changed() => {
                if changed.is_err() {
                    break;
                }
                pending = Some(input.borrow_and_update().clone());
            }
            _ = sleep(quiet), if pending.is_some() => {
                let Some(query) = pending.take() else { continue };
                let provider = Arc::clone(&provider);
                let results = Arc::clone(&results);

                tokio::spawn(async move {
                    let found = search_locations(provider.as_ref(), &query).await;
                    tracing::debug!(query, count = found.len(), "publishing suggestions");
                    results.send_replace(found);
                });
            }
        }
    }
}
