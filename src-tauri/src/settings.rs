use std::{collections::HashMap, fs, path::PathBuf};

use serde_json::{Map, Value};

use crate::{config::AppConfig, error::StoreError};

pub const SETTINGS_FILE: &str = "settings.json";

/// Synchronous key-value storage.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// All keys kept in one pretty-printed JSON object, rewritten on every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    log::warn!("discarding malformed settings file {}", path.display());
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };
        Self { path, values }
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Typed access to the two preferences the shortcut list uses.
pub struct ShortcutPrefs {
    store: Box<dyn SettingsStore>,
    first_start_key: String,
    first_start_default: bool,
    package_names_key: String,
}

impl ShortcutPrefs {
    pub fn new(store: Box<dyn SettingsStore>, config: &AppConfig) -> Self {
        Self {
            store,
            first_start_key: config.pref_first_start.clone(),
            first_start_default: config.first_start_default,
            package_names_key: config.pref_package_names.clone(),
        }
    }

    pub fn first_start(&self) -> bool {
        self.store
            .get(&self.first_start_key)
            .and_then(|value| value.as_bool())
            .unwrap_or(self.first_start_default)
    }

    pub fn set_first_start(&mut self, value: bool) {
        if let Err(err) = self.store.set(&self.first_start_key, Value::Bool(value)) {
            log::warn!("failed to persist {}: {err}", self.first_start_key);
        }
    }

    /// `None` when the key is absent, which is distinct from an empty list.
    pub fn package_names(&self) -> Option<Vec<String>> {
        let value = self.store.get(&self.package_names_key)?;
        match serde_json::from_value::<Vec<String>>(value) {
            Ok(names) => Some(names),
            Err(err) => {
                log::warn!("ignoring malformed {}: {err}", self.package_names_key);
                None
            }
        }
    }

    pub fn set_package_names(&mut self, names: &[String]) {
        let value = Value::from(names.to_vec());
        if let Err(err) = self.store.set(&self.package_names_key, value) {
            log::warn!("failed to persist {}: {err}", self.package_names_key);
        }
    }

    pub fn delete_package_names(&mut self) {
        if let Err(err) = self.store.delete(&self.package_names_key) {
            log::warn!("failed to delete {}: {err}", self.package_names_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> ShortcutPrefs {
        ShortcutPrefs::new(Box::new(MemoryStore::new()), &AppConfig::default())
    }

    #[test]
    fn absent_and_empty_are_distinct() {
        let mut prefs = prefs();
        assert_eq!(prefs.package_names(), None);

        prefs.set_package_names(&[]);
        assert_eq!(prefs.package_names(), Some(Vec::new()));

        prefs.delete_package_names();
        assert_eq!(prefs.package_names(), None);
    }

    #[test]
    fn first_start_falls_back_to_configured_default() {
        let config = AppConfig {
            first_start_default: false,
            ..AppConfig::default()
        };
        let mut prefs = ShortcutPrefs::new(Box::new(MemoryStore::new()), &config);
        assert!(!prefs.first_start());
        prefs.set_first_start(true);
        assert!(prefs.first_start());
    }

    #[test]
    fn non_list_value_reads_as_absent() {
        let config = AppConfig::default();
        let mut store = MemoryStore::new();
        store
            .set(&config.pref_package_names, Value::from("a.app"))
            .unwrap();
        let prefs = ShortcutPrefs::new(Box::new(store), &config);
        assert_eq!(prefs.package_names(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);

        let mut store = JsonFileStore::open(&path);
        store.set("names", Value::from(vec!["a.app", "b.app"])).unwrap();
        store.set("flag", Value::Bool(false)).unwrap();
        store.delete("flag").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get("names"),
            Some(Value::from(vec!["a.app", "b.app"]))
        );
        assert_eq!(reopened.get("flag"), None);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "[1, 2").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("anything"), None);
    }
}
