use std::sync::{Arc, Mutex, MutexGuard};

use tauri::{AppHandle, Emitter, State};

use crate::{
    config::AppConfig,
    manager::ShortcutManager,
    models::ShortcutEntry,
    state::AppState,
    task::SeedJob,
    view::{ShortcutView, ViewEvent},
};

pub const SHORTCUT_EVENT: &str = "shortcut://event";

/// Forwards every list signal to the webview.
pub struct TauriView {
    handle: AppHandle,
}

impl TauriView {
    pub fn new(handle: AppHandle) -> Self {
        Self { handle }
    }
}

impl ShortcutView for TauriView {
    fn report(&mut self, event: ViewEvent) {
        if let Err(err) = self.handle.emit(SHORTCUT_EVENT, &event) {
            log::warn!("failed to emit {event:?}: {err}");
        }
    }
}

fn lock(manager: &Mutex<ShortcutManager>) -> Result<MutexGuard<'_, ShortcutManager>, String> {
    manager
        .lock()
        .map_err(|_| "shortcut list unavailable".to_string())
}

pub fn spawn_seed(manager: Arc<Mutex<ShortcutManager>>, job: SeedJob) {
    tauri::async_runtime::spawn(async move {
        let outcome = match tauri::async_runtime::spawn_blocking(move || job.run()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("seed task failed: {err}");
                if let Ok(mut guard) = manager.lock() {
                    guard.load_items();
                }
                return;
            }
        };
        if let Ok(mut guard) = manager.lock() {
            guard.finish_seed(outcome);
        }
    });
}

#[tauri::command]
pub fn load_items(state: State<'_, AppState>) -> Result<(), String> {
    lock(&state.manager)?.load_items();
    Ok(())
}

#[tauri::command]
pub async fn open_picker(state: State<'_, AppState>) -> Result<(), String> {
    let job = {
        let mut guard = lock(&state.manager)?;
        guard
            .ensure_not_reordering("open the picker")
            .map_err(|err| err.to_string())?;
        guard.open_picker()
    };
    let Some(job) = job else {
        return Ok(());
    };

    let manager = Arc::clone(&state.manager);
    tauri::async_runtime::spawn(async move {
        match tauri::async_runtime::spawn_blocking(move || job.run()).await {
            Ok(outcome) => {
                if let Ok(mut guard) = manager.lock() {
                    guard.finish_open_picker(outcome);
                }
            }
            Err(err) => log::error!("picker task failed: {err}"),
        }
    });

    Ok(())
}

#[tauri::command]
pub fn select_from_picker(index: usize, state: State<'_, AppState>) -> Result<bool, String> {
    let mut guard = lock(&state.manager)?;
    guard
        .ensure_not_reordering("add")
        .map_err(|err| err.to_string())?;
    Ok(guard.select_from_picker(index))
}

#[tauri::command]
pub fn remove_item(position: usize, state: State<'_, AppState>) -> Result<bool, String> {
    let mut guard = lock(&state.manager)?;
    guard
        .ensure_not_reordering("remove")
        .map_err(|err| err.to_string())?;
    Ok(guard.remove_item(position))
}

#[tauri::command]
pub fn move_item(from: usize, to: usize, state: State<'_, AppState>) -> Result<(), String> {
    lock(&state.manager)?.move_item(from, to);
    Ok(())
}

#[tauri::command]
pub fn undo_remove(state: State<'_, AppState>) -> Result<(), String> {
    let mut guard = lock(&state.manager)?;
    guard
        .ensure_not_reordering("undo")
        .map_err(|err| err.to_string())?;
    guard.undo_remove();
    Ok(())
}

#[tauri::command]
pub fn enter_reorder_mode(
    current: Vec<ShortcutEntry>,
    state: State<'_, AppState>,
) -> Result<(), String> {
    lock(&state.manager)?.enter_reorder_mode(current);
    Ok(())
}

#[tauri::command]
pub fn accept_reorder(
    new_order: Vec<ShortcutEntry>,
    state: State<'_, AppState>,
) -> Result<(), String> {
    lock(&state.manager)?.accept_reorder(&new_order);
    Ok(())
}

#[tauri::command]
pub fn cancel_reorder(state: State<'_, AppState>) -> Result<(), String> {
    lock(&state.manager)?.cancel_reorder();
    Ok(())
}

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> AppConfig {
    state
        .config
        .lock()
        .map(|cfg| cfg.clone())
        .unwrap_or_default()
}

#[tauri::command]
pub fn update_capacity(
    max_apps_in_notification: usize,
    state: State<'_, AppState>,
) -> Result<AppConfig, String> {
    if max_apps_in_notification == 0 {
        return Err("capacity must be at least one".into());
    }

    let updated = {
        let mut guard = state
            .config
            .lock()
            .map_err(|_| "config unavailable".to_string())?;
        guard.max_apps_in_notification = max_apps_in_notification;
        guard.save(&state.config_path)?;
        guard.clone()
    };

    lock(&state.manager)?.load_items();
    Ok(updated)
}
