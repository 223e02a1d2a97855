//! Persisted user preferences on top of a small key-value boundary.

use std::{collections::HashMap, fs, io, path::PathBuf};

use parking_lot::Mutex;

use crate::{StoreError, model::UserPreferences};

/// Key under which the preferences document is kept.
pub const PREFERENCES_KEY: &str = "weather-app-preferences";

/// String values addressed by fixed keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read-modify-write access to the [`UserPreferences`] document.
///
/// Reads never fail (defaults stand in for missing or corrupt data) and writes
/// are best-effort: failures are logged and otherwise ignored. Every mutation
/// rewrites the whole document.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn get(&self) -> UserPreferences {
        let raw = match self.backend.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return UserPreferences::default(),
            Err(e) => {
                tracing::warn!(error = %e, "error reading preferences");
                return UserPreferences::default();
            }
        };

        match serde_json::from_str::<UserPreferences>(&raw) {
            Ok(mut prefs) => {
                prefs.dedup_favorites();
                prefs
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored preferences are corrupt; using defaults");
                UserPreferences::default()
            }
        }
    }

    pub fn set(&self, prefs: &UserPreferences) {
        let result = serde_json::to_string(prefs)
            .map_err(StoreError::from)
            .and_then(|json| self.backend.set(PREFERENCES_KEY, &json));

        if let Err(e) = result {
            tracing::warn!(error = %e, "error saving preferences");
        }
    }

    fn update(&self, f: impl FnOnce(&mut UserPreferences)) -> UserPreferences {
        let mut prefs = self.get();
        f(&mut prefs);
        self.set(&prefs);
        prefs
    }

    pub fn toggle_unit(&self) -> UserPreferences {
        self.update(|p| p.unit = p.unit.toggled())
    }

    pub fn add_favorite(&self, name: &str) -> UserPreferences {
        self.update(|p| {
            if !p.is_favorite(name) {
                p.favorites.push(name.to_string());
            }
        })
    }

    pub fn remove_favorite(&self, name: &str) -> UserPreferences {
        self.update(|p| p.favorites.retain(|f| f != name))
    }

    /// Remove `name` if it is a favorite, add it otherwise.
    pub fn toggle_favorite(&self, name: &str) -> UserPreferences {
        self.update(|p| {
            if p.is_favorite(name) {
                p.favorites.retain(|f| f != name);
            } else {
                p.favorites.push(name.to_string());
            }
        })
    }

    pub fn set_last_searched(&self, name: &str) -> UserPreferences {
        self.update(|p| p.last_searched = name.to_string())
    }
}
