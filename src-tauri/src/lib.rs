pub mod catalog;
pub mod config;
pub mod error;
pub mod icon;
pub mod manager;
pub mod models;
pub mod settings;
pub mod task;
pub mod view;

#[cfg(target_os = "android")]
pub mod android_catalog;

#[cfg(feature = "app")]
mod commands;
#[cfg(feature = "app")]
mod state;

#[cfg(feature = "app")]
pub use app::run;

#[cfg(feature = "app")]
mod app {
    use std::{
        path::Path,
        sync::{Arc, Mutex},
    };

    use log::info;
    use tauri::Manager;

    use crate::{
        catalog::AppCatalog,
        commands::{
            accept_reorder, cancel_reorder, enter_reorder_mode, get_settings, load_items,
            move_item, open_picker, remove_item, select_from_picker, spawn_seed, undo_remove,
            update_capacity, TauriView,
        },
        config::{AppConfig, CONFIG_FILE},
        manager::ShortcutManager,
        settings::{JsonFileStore, ShortcutPrefs, SETTINGS_FILE},
        state::AppState,
    };

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        #[cfg(target_os = "android")]
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("QuickOpen"),
        );

        tauri::Builder::default()
            .invoke_handler(tauri::generate_handler![
                load_items,
                open_picker,
                select_from_picker,
                remove_item,
                move_item,
                undo_remove,
                enter_reorder_mode,
                accept_reorder,
                cancel_reorder,
                get_settings,
                update_capacity
            ])
            .setup(|app| {
                let handle = app.handle();
                let config_dir = handle.path().app_config_dir()?;
                let cache_dir = handle.path().app_cache_dir()?;

                let config_path = config_dir.join(CONFIG_FILE);
                let config = Arc::new(Mutex::new(AppConfig::load(&config_path)));
                let store = JsonFileStore::open(config_dir.join(SETTINGS_FILE));
                let prefs = match config.lock() {
                    Ok(guard) => ShortcutPrefs::new(Box::new(store), &guard),
                    Err(_) => ShortcutPrefs::new(Box::new(store), &AppConfig::default()),
                };

                let catalog = platform_catalog(&config_dir, &cache_dir);
                let mut manager = ShortcutManager::new(Arc::clone(&config), prefs, catalog);
                let seed = manager.attach(Box::new(TauriView::new(handle.clone())));

                let state = AppState::new(manager, config, config_path);
                let shared = Arc::clone(&state.manager);
                app.manage(state);

                if let Some(job) = seed {
                    spawn_seed(shared, job);
                }
                info!("quick open ready, settings in {}", config_dir.display());
                Ok(())
            })
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }

    #[cfg(target_os = "android")]
    fn platform_catalog(_config_dir: &Path, cache_dir: &Path) -> Arc<dyn AppCatalog> {
        use crate::{android_catalog::AndroidCatalog, icon::IconCache};

        Arc::new(AndroidCatalog::new(Some(IconCache::new(
            cache_dir.join("icons"),
        ))))
    }

    /// Off-device the registry comes from an `apps.json` fixture next to the
    /// settings, so the shell can be exercised on a desktop.
    #[cfg(not(target_os = "android"))]
    fn platform_catalog(config_dir: &Path, _cache_dir: &Path) -> Arc<dyn AppCatalog> {
        use crate::catalog::MemoryCatalog;

        let fixture = config_dir.join("apps.json");
        match MemoryCatalog::from_file(&fixture) {
            Ok(catalog) => Arc::new(catalog),
            Err(err) => {
                log::warn!("no application fixture at {}: {err}", fixture.display());
                Arc::new(MemoryCatalog::default())
            }
        }
    }
}
