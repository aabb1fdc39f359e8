use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.json";

const DEFAULT_DUMMY_ITEMS: &[&str] = &[
    "com.android.chrome",
    "com.google.android.gm",
    "com.google.android.apps.maps",
    "com.whatsapp",
    "org.telegram.messenger",
    "com.spotify.music",
    "com.google.android.youtube",
    "com.android.settings",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Capacity of the shortcut list.
    pub max_apps_in_notification: usize,
    pub first_start_default: bool,
    pub pref_first_start: String,
    pub pref_package_names: String,
    /// Ordered candidates for first-run seeding.
    pub dummy_items_package_names: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_apps_in_notification: 5,
            first_start_default: true,
            pref_first_start: "pref_first_start".to_string(),
            pref_package_names: "pref_package_names".to_string(),
            dummy_items_package_names: DEFAULT_DUMMY_ITEMS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Self {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                log::warn!("ignoring malformed {}: {err}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| err.to_string())?;
        }
        let data = serde_json::to_string_pretty(self).map_err(|err| err.to_string())?;
        fs::write(path, data).map_err(|err| err.to_string())
    }
}
