use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{config::AppConfig, manager::ShortcutManager};

pub struct AppState {
    pub manager: Arc<Mutex<ShortcutManager>>,
    pub config: Arc<Mutex<AppConfig>>,
    pub config_path: PathBuf,
}

impl AppState {
    pub fn new(
        manager: ShortcutManager,
        config: Arc<Mutex<AppConfig>>,
        config_path: PathBuf,
    ) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
            config,
            config_path,
        }
    }
}
