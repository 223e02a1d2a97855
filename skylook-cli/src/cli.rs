use std::{fmt, sync::Arc};

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use skylook_core::{
    Config, ViewState, WeatherSession,
    search::{DEBOUNCE, DebouncedSearch, search_locations},
    store::{FileStore, KeyValueStore, PreferenceStore},
};

use crate::{
    complete::{LocationCompleter, chosen_query},
    render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skylook", version, about = "Weather lookup from the terminal")]
pub struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and geolocation preference.
    Configure,

    /// Show weather for a location.
    Show {
        /// Place name; defaults to the last searched location.
        location: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show weather at your current position.
    Here {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// List locations matching a partial name.
    Search {
        query: String,
    },

    /// Search interactively with autocomplete.
    Pick {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show the temperature unit, or switch it.
    Unit {
        #[arg(long)]
        toggle: bool,
    },

    /// Manage favorite locations.
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },

    /// Show saved preferences.
    Settings,
}

#[derive(Debug, Subcommand)]
pub enum FavAction {
    Add { name: String },
    Remove { name: String },
    /// Add if absent, remove if present.
    Toggle { name: String },
    List,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Include a daily forecast.
    #[arg(long)]
    forecast: bool,

    /// Forecast length in days (implies --forecast).
    #[arg(long)]
    days: Option<usize>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl ViewArgs {
    fn forecast_days(&self, config: &Config) -> Option<usize> {
        self.days.or(self.forecast.then_some(config.forecast_days))
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        tracing::debug!(command = ?self.command, "running");

        match self.command {
            Command::Configure => configure(config),
            Command::Unit { toggle } => {
                let store = preference_store()?;
                let prefs = if toggle {
                    store.toggle_unit()
                } else {
                    store.get()
                };
                println!("Temperature unit: {}", prefs.unit.label());
                Ok(())
            }
            Command::Fav { action } => {
                let store = preference_store()?;
                let prefs = match action {
                    FavAction::Add { name } => store.add_favorite(&name),
                    FavAction::Remove { name } => store.remove_favorite(&name),
                    FavAction::Toggle { name } => store.toggle_favorite(&name),
                    FavAction::List => store.get(),
                };
                print!("{}", render::favorites(&prefs));
                Ok(())
            }
            Command::Settings => {
                print!("{}", render::settings(&preference_store()?.get()));
                Ok(())
            }
            Command::Search { query } => {
                let client = config.weather_client()?;
                let found = search_locations(client.provider().as_ref(), &query).await;
                print!("{}", render::suggestions(&found));
                Ok(())
            }
            Command::Show { location, view } => {
                let mut session = open_session(&config)?;
                let location =
                    location.unwrap_or_else(|| session.preferences().last_searched.clone());
                lookup(&mut session, &location, view.forecast_days(&config)).await;
                present(&session, view.json)
            }
            Command::Here { view } => {
                let mut session = open_session(&config)?;
                if let Some(days) = view.forecast_days(&config) {
                    session.prefer_forecast(days);
                }
                locate(&mut session).await;
                present(&session, view.json)
            }
            Command::Pick { view } => {
                let mut session = open_session(&config)?;
                pick(&mut session, view.forecast_days(&config)).await
            }
        }
    }
}

fn configure(mut config: Config) -> Result<()> {
    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.set_api_key(key);
    config.api_key()?;

    config.geolocation.enabled = Confirm::new("Use IP-based geolocation for `skylook here`?")
        .with_default(config.geolocation.enabled)
        .prompt()?;

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn preference_store() -> Result<PreferenceStore<FileStore>> {
    Ok(PreferenceStore::new(Config::preference_backend()?))
}

fn open_session(config: &Config) -> Result<WeatherSession<FileStore>> {
    Ok(WeatherSession::new(
        config.weather_client()?,
        config.geolocator(),
        preference_store()?,
    ))
}

async fn lookup<S: KeyValueStore>(
    session: &mut WeatherSession<S>,
    location: &str,
    days: Option<usize>,
) {
    match days {
        Some(days) => session.load_forecast(location, days).await,
        None => session.load(location).await,
    };
}

/// Load weather at the current position, announcing any fallback.
async fn locate<S: KeyValueStore>(session: &mut WeatherSession<S>) {
    if let Some(e) = session.use_current_location().await {
        let fallback = &session.preferences().last_searched;
        eprintln!("{e}. Showing {fallback} instead.");
    }
}

fn view_text<S: KeyValueStore>(session: &WeatherSession<S>) -> Option<String> {
    match session.state() {
        ViewState::Success { snapshot, forecast } => {
            let prefs = session.preferences();
            let mut out = render::weather_card(snapshot, prefs);
            if let Some(days) = forecast {
                out.push('\n');
                out.push_str(&render::forecast(days, prefs.unit));
            }
            Some(out)
        }
        _ => None,
    }
}

fn present<S: KeyValueStore>(session: &WeatherSession<S>, json: bool) -> Result<()> {
    match session.state() {
        ViewState::Success { snapshot, forecast } if json => {
            let doc = serde_json::json!({ "snapshot": snapshot, "forecast": forecast });
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        ViewState::Success { .. } => {
            print!("{}", view_text(session).unwrap_or_default());
            Ok(())
        }
        ViewState::Failure(msg) => Err(anyhow!("{msg}")),
        ViewState::Idle | ViewState::Loading => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SearchAgain,
    OpenFavorite,
    UseCurrentLocation,
    Retry,
    ToggleUnit,
    ToggleFavorite { is_favorite: bool },
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SearchAgain => f.write_str("Search another location"),
            Action::OpenFavorite => f.write_str("Open a favorite"),
            Action::UseCurrentLocation => f.write_str("Use current location"),
            Action::Retry => f.write_str("Try again"),
            Action::ToggleUnit => f.write_str("Switch temperature unit"),
            Action::ToggleFavorite { is_favorite: true } => f.write_str("Remove from favorites"),
            Action::ToggleFavorite { is_favorite: false } => f.write_str("Add to favorites"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn actions<S: KeyValueStore>(session: &WeatherSession<S>) -> Vec<Action> {
    let mut menu = match session.state() {
        ViewState::Failure(_) => vec![Action::Retry, Action::SearchAgain],
        _ => vec![
            Action::SearchAgain,
            Action::ToggleUnit,
            Action::ToggleFavorite {
                is_favorite: session.showing_favorite(),
            },
        ],
    };
    if !session.preferences().favorites.is_empty() {
        menu.push(Action::OpenFavorite);
    }
    menu.push(Action::UseCurrentLocation);
    menu.push(Action::Quit);
    menu
}

async fn prompt_location(search: Arc<DebouncedSearch>) -> Result<Option<String>> {
    let completer = LocationCompleter::new(Arc::clone(&search));

    // Blocking prompt; the search worker keeps running on the runtime.
    let answer = tokio::task::spawn_blocking(move || {
        Text::new("Location:")
            .with_placeholder("Search for a city...")
            .with_autocomplete(completer)
            .prompt_skippable()
    })
    .await??;

    Ok(answer
        .map(|input| chosen_query(&input, &search.latest()))
        .filter(|q| !q.is_empty()))
}

async fn pick<S: KeyValueStore>(
    session: &mut WeatherSession<S>,
    days: Option<usize>,
) -> Result<()> {
    let provider = session.client().provider();
    let search = Arc::new(DebouncedSearch::spawn(provider, DEBOUNCE));

    'search: loop {
        let Some(location) = prompt_location(Arc::clone(&search)).await? else {
            return Ok(());
        };
        lookup(session, &location, days).await;

        loop {
            match view_text(session) {
                Some(text) => print!("\n{text}\n"),
                None => {
                    if let Some(msg) = session.state().error() {
                        eprintln!("\nError: {msg}\n");
                    }
                }
            }

            let choice = Select::new("Next:", actions(session)).prompt_skippable()?;
            match choice {
                Some(Action::SearchAgain) => continue 'search,
                Some(Action::OpenFavorite) => {
                    let favorites = session.preferences().favorites.clone();
                    if let Some(name) = Select::new("Favorite:", favorites).prompt_skippable()? {
                        lookup(session, &name, days).await;
                    }
                }
                Some(Action::UseCurrentLocation) => {
                    if let Some(days) = days {
                        session.prefer_forecast(days);
                    }
                    locate(session).await;
                }
                Some(Action::Retry) => {
                    session.retry().await;
                }
                Some(Action::ToggleUnit) => {
                    session.toggle_unit();
                }
                Some(Action::ToggleFavorite { .. }) => {
                    let name = session.state().snapshot().map(|s| s.location.name.clone());
                    if let Some(name) = name {
                        session.toggle_favorite(&name);
                    }
                }
                Some(Action::Quit) | None => return Ok(()),
            }
        }
    }
}
