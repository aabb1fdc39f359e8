use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use log::{debug, info, warn};

use crate::{
    catalog::AppCatalog,
    config::AppConfig,
    error::EditError,
    models::{RemovedEntry, ShortcutEntry},
    settings::ShortcutPrefs,
    task::{PickerJob, PickerOutcome, SeedJob, SeedOutcome},
    view::{ShortcutView, ViewEvent},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Holds the list as presented when reordering started, for cancel.
    Reordering { snapshot: Vec<ShortcutEntry> },
}

/// Owns the persisted, ordered list of chosen package names and reports every
/// change to the attached view.
///
/// All methods are meant to run on one (UI) thread. The two enumeration
/// pipelines are handed out as jobs; see [`crate::task`].
pub struct ShortcutManager {
    config: Arc<Mutex<AppConfig>>,
    prefs: ShortcutPrefs,
    catalog: Arc<dyn AppCatalog>,
    view: Option<Box<dyn ShortcutView>>,
    /// Bumped on every attach and detach; jobs started under an older value
    /// report nothing.
    generation: u64,
    mode: Mode,
    undo: Option<RemovedEntry>,
    last_shown: Vec<ShortcutEntry>,
}

impl ShortcutManager {
    pub fn new(
        config: Arc<Mutex<AppConfig>>,
        prefs: ShortcutPrefs,
        catalog: Arc<dyn AppCatalog>,
    ) -> Self {
        Self {
            config,
            prefs,
            catalog,
            view: None,
            generation: 0,
            mode: Mode::Normal,
            undo: None,
            last_shown: Vec::new(),
        }
    }

    /// Installs `view` and runs first-run seeding. The returned job, if any,
    /// must be run and handed to [`Self::finish_seed`].
    pub fn attach(&mut self, view: Box<dyn ShortcutView>) -> Option<SeedJob> {
        self.view = Some(view);
        self.generation += 1;
        self.seed_dummy_items_if_first_run()
    }

    pub fn detach(&mut self) {
        self.view = None;
        self.generation += 1;
    }

    pub fn is_attached(&self) -> bool {
        self.view.is_some()
    }

    pub fn is_reordering(&self) -> bool {
        matches!(self.mode, Mode::Reordering { .. })
    }

    /// The persisted list; empty when absent.
    pub fn package_names(&self) -> Vec<String> {
        self.prefs.package_names().unwrap_or_default()
    }

    pub fn undo_entry(&self) -> Option<&RemovedEntry> {
        self.undo.as_ref()
    }

    fn max_items(&self) -> usize {
        self.config
            .lock()
            .map(|config| config.max_apps_in_notification)
            .unwrap_or_else(|_| AppConfig::default().max_apps_in_notification)
    }

    fn report(&mut self, event: ViewEvent) {
        if let Some(view) = self.view.as_mut() {
            view.report(event);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.view.is_some() && self.generation == generation
    }

    /// Seeds the list from the configured candidates on the very first run.
    /// Clears the first-run flag whether or not a seed job is produced.
    pub fn seed_dummy_items_if_first_run(&mut self) -> Option<SeedJob> {
        if !self.prefs.first_start() {
            return None;
        }

        let job = match self.prefs.package_names() {
            Some(names) if !names.is_empty() => None,
            _ => {
                self.report(ViewEvent::ShowProgress);
                let candidates = self
                    .config
                    .lock()
                    .map(|config| config.dummy_items_package_names.clone())
                    .unwrap_or_default();
                Some(SeedJob {
                    generation: self.generation,
                    catalog: Arc::clone(&self.catalog),
                    candidates,
                })
            }
        };

        self.prefs.set_first_start(false);
        job
    }

    pub fn finish_seed(&mut self, outcome: SeedOutcome) {
        match outcome.result {
            Ok(names) => {
                info!("seeded {} shortcuts on first run", names.len());
                self.prefs.set_package_names(&names);
            }
            Err(err) => warn!("first-run seeding skipped: {err}"),
        }

        if self.is_current(outcome.generation) {
            self.load_items();
        } else {
            debug!("dropping seed result for a detached view");
        }
    }

    /// Resolves the persisted list and replaces the presented one. Packages
    /// that no longer resolve are left out but stay persisted.
    pub fn load_items(&mut self) {
        if !self.is_attached() {
            return;
        }

        self.report(ViewEvent::ShowProgress);

        let names = self.package_names();
        let items = self.catalog.resolve_all(&names);
        if items.len() < names.len() {
            debug!("{} persisted shortcuts no longer resolve", names.len() - items.len());
        }

        if names.len() >= self.max_items() {
            self.report(ViewEvent::HideAddButton);
        }
        self.report(ViewEvent::UpdateItems { items });
        self.report(ViewEvent::HideProgress);
    }

    /// Starts building the picker. `None` when detached or already at capacity.
    pub fn open_picker(&mut self) -> Option<PickerJob> {
        if !self.is_attached() {
            return None;
        }

        self.report(ViewEvent::ShowProgress);

        let names = self.package_names();
        if names.len() >= self.max_items() {
            self.report(ViewEvent::HideAddButton);
            self.report(ViewEvent::HideProgress);
            self.report(ViewEvent::MaxItemsError);
            return None;
        }

        Some(PickerJob {
            generation: self.generation,
            catalog: Arc::clone(&self.catalog),
            exclude: names.into_iter().collect::<HashSet<_>>(),
        })
    }

    pub fn finish_open_picker(&mut self, outcome: PickerOutcome) {
        if !self.is_current(outcome.generation) {
            debug!("dropping picker result for a detached view");
            return;
        }

        match outcome.result {
            Ok(entries) => {
                self.last_shown = entries.clone();
                self.report(ViewEvent::HideProgress);
                self.report(ViewEvent::ShowPicker { entries });
            }
            Err(err) => {
                warn!("failed to build application list: {err}");
                self.report(ViewEvent::HideProgress);
                self.report(ViewEvent::OpenApplicationListError);
            }
        }
    }

    /// Appends the `index`-th entry of the last presented picker.
    pub fn select_from_picker(&mut self, index: usize) -> bool {
        match self.last_shown.get(index).cloned() {
            Some(entry) => self.add_item(usize::MAX, entry),
            None => {
                warn!(
                    "picker index {index} out of range ({} shown)",
                    self.last_shown.len()
                );
                false
            }
        }
    }

    /// Inserts `entry` at `position`, appending when `position` is past the
    /// end. Returns `false` without touching the list when at capacity or when
    /// the package is already present.
    pub fn add_item(&mut self, position: usize, entry: ShortcutEntry) -> bool {
        if self.is_reordering() {
            warn!("adding {} while reordering", entry.package_name);
        }

        let mut names = self.package_names();
        if names.contains(&entry.package_name) {
            warn!("{} is already in the list", entry.package_name);
            return false;
        }
        let max = self.max_items();

        if names.len() >= max {
            self.report(ViewEvent::HideAddButton);
            self.report(ViewEvent::MaxItemsError);
            return false;
        }
        if names.len() + 1 == max {
            self.report(ViewEvent::HideAddButton);
        }

        let index = if position >= names.len() {
            names.push(entry.package_name.clone());
            names.len() - 1
        } else {
            names.insert(position, entry.package_name.clone());
            position
        };
        self.prefs.set_package_names(&names);

        self.report(ViewEvent::AddItem {
            position: index,
            entry,
        });
        true
    }

    /// Removes the entry at `position`, keeping it in the undo buffer. Removing
    /// the last entry deletes the persisted list.
    pub fn remove_item(&mut self, position: usize) -> bool {
        if self.is_reordering() {
            warn!("removing position {position} while reordering");
        }

        let mut names = self.package_names();
        let Some(package_name) = names.get(position).cloned() else {
            warn!("remove position {position} out of range ({} items)", names.len());
            return false;
        };

        let entry = self
            .catalog
            .resolve(&package_name)
            .unwrap_or_else(|| ShortcutEntry::unresolved(package_name));
        self.undo = Some(RemovedEntry { position, entry });

        if names.len() > 1 {
            names.remove(position);
            self.prefs.set_package_names(&names);
        } else {
            self.prefs.delete_package_names();
        }

        self.report(ViewEvent::ShowAddButton);
        self.report(ViewEvent::RemoveItem { position });
        self.report(ViewEvent::ShowUndo);
        true
    }

    /// Walks the entry at `from` to `to` by adjacent swaps.
    pub fn move_item(&mut self, from: usize, to: usize) {
        let Some(mut names) = self.prefs.package_names() else {
            return;
        };
        if names.is_empty() {
            return;
        }
        if from >= names.len() || to >= names.len() {
            warn!("move {from} -> {to} out of range ({} items)", names.len());
            return;
        }

        if from < to {
            for i in from..to {
                names.swap(i, i + 1);
            }
        } else {
            for i in (to + 1..=from).rev() {
                names.swap(i, i - 1);
            }
        }
        self.prefs.set_package_names(&names);

        self.report(ViewEvent::MoveItem { from, to });
    }

    /// Re-inserts the most recently removed entry. Subject to the same
    /// capacity check as any add.
    pub fn undo_remove(&mut self) {
        let Some(removed) = self.undo.take() else {
            return;
        };

        self.add_item(removed.position, removed.entry);
        self.report(ViewEvent::HideUndo);
    }

    pub fn enter_reorder_mode(&mut self, current: Vec<ShortcutEntry>) {
        self.mode = Mode::Reordering { snapshot: current };

        self.report(ViewEvent::HideAddButton);
        self.report(ViewEvent::ReorderMode { enabled: true });
    }

    /// Persists the order of `new_order` over the current list. Only packages
    /// already in the list are taken, each once; persisted packages missing
    /// from `new_order` keep their relative order at the end.
    pub fn accept_reorder(&mut self, new_order: &[ShortcutEntry]) {
        if !self.is_reordering() {
            debug!("accepting reorder outside of reorder mode");
        }
        self.mode = Mode::Normal;

        let names = reordered(&self.package_names(), new_order);

        self.report(ViewEvent::ShowProgress);
        self.report_add_button_after_reorder(names.len());
        self.report(ViewEvent::ReorderMode { enabled: false });

        if !names.is_empty() {
            self.prefs.set_package_names(&names);
        }

        self.report(ViewEvent::HideProgress);
    }

    /// Leaves reorder mode and re-presents the list as it was when it started.
    pub fn cancel_reorder(&mut self) {
        let Mode::Reordering { snapshot } = std::mem::replace(&mut self.mode, Mode::Normal)
        else {
            debug!("cancel reorder outside of reorder mode");
            return;
        };

        self.report(ViewEvent::ShowProgress);
        self.report_add_button_after_reorder(snapshot.len());
        self.report(ViewEvent::ReorderMode { enabled: false });
        self.report(ViewEvent::UpdateItems { items: snapshot });
        self.report(ViewEvent::HideProgress);
    }

    fn report_add_button_after_reorder(&mut self, presented: usize) {
        if presented.max(self.package_names().len()) < self.max_items() {
            self.report(ViewEvent::ShowAddButton);
        }
    }

    /// Rejects `action` while the list is being reordered.
    pub fn ensure_not_reordering(&self, action: &'static str) -> Result<(), EditError> {
        if self.is_reordering() {
            return Err(EditError::Reordering(action));
        }
        Ok(())
    }
}

/// `current` arranged in the order its packages appear in `new_order`.
fn reordered(current: &[String], new_order: &[ShortcutEntry]) -> Vec<String> {
    let mut pending: Vec<&String> = current.iter().collect();
    let mut names = Vec::with_capacity(current.len());
    for entry in new_order {
        if let Some(index) = pending.iter().position(|name| **name == entry.package_name) {
            names.push(pending.remove(index).clone());
        } else if !entry.package_name.is_empty() {
            warn!("ignoring {} in reorder: not in the list", entry.package_name);
        }
    }
    names.extend(pending.into_iter().cloned());
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{CatalogApp, MemoryCatalog},
        settings::MemoryStore,
        view::RecordingView,
    };

    fn manager(names: &[&str]) -> (ShortcutManager, RecordingView) {
        let config = AppConfig {
            first_start_default: false,
            ..AppConfig::default()
        };
        let catalog = MemoryCatalog::new(
            ["a.app", "b.app", "c.app", "d.app"]
                .iter()
                .map(|name| CatalogApp::user(name, &name.to_uppercase()))
                .collect(),
        );
        let mut prefs = ShortcutPrefs::new(Box::new(MemoryStore::new()), &config);
        if !names.is_empty() {
            let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
            prefs.set_package_names(&names);
        }
        let mut manager =
            ShortcutManager::new(Arc::new(Mutex::new(config)), prefs, Arc::new(catalog));
        let view = RecordingView::new();
        assert!(manager.attach(Box::new(view.clone())).is_none());
        (manager, view)
    }

    fn entry(name: &str) -> ShortcutEntry {
        ShortcutEntry::new(name, name.to_uppercase(), format!("icon:{name}"))
    }

    #[test]
    fn reorder_cancel_restores_snapshot() {
        let (mut manager, view) = manager(&["a.app", "b.app"]);
        let before = vec![entry("a.app"), entry("b.app")];

        manager.enter_reorder_mode(before.clone());
        assert!(manager.is_reordering());
        manager.move_item(0, 1);
        view.take();

        manager.cancel_reorder();
        assert!(!manager.is_reordering());
        assert_eq!(
            view.take(),
            vec![
                ViewEvent::ShowProgress,
                ViewEvent::ShowAddButton,
                ViewEvent::ReorderMode { enabled: false },
                ViewEvent::UpdateItems { items: before },
                ViewEvent::HideProgress,
            ]
        );
    }

    #[test]
    fn reorder_accept_drops_entries_without_package() {
        let (mut manager, view) = manager(&["a.app", "b.app"]);
        manager.enter_reorder_mode(vec![entry("a.app"), entry("b.app")]);
        assert_eq!(
            view.take(),
            vec![
                ViewEvent::HideAddButton,
                ViewEvent::ReorderMode { enabled: true },
            ]
        );

        manager.accept_reorder(&[entry("b.app"), ShortcutEntry::unresolved(""), entry("a.app")]);
        assert!(!manager.is_reordering());
        assert_eq!(manager.package_names(), vec!["b.app", "a.app"]);
        assert!(view.take().contains(&ViewEvent::ReorderMode { enabled: false }));
    }

    #[test]
    fn reorder_accept_keeps_only_listed_packages_once() {
        let (mut manager, _view) = manager(&["a.app", "b.app", "c.app"]);
        manager.enter_reorder_mode(vec![entry("a.app"), entry("b.app"), entry("c.app")]);

        manager.accept_reorder(&[
            entry("c.app"),
            entry("d.app"),
            entry("a.app"),
            entry("c.app"),
        ]);
        assert_eq!(manager.package_names(), vec!["c.app", "a.app", "b.app"]);
    }

    #[test]
    fn edits_are_rejected_while_reordering() {
        let (mut manager, _view) = manager(&["a.app"]);
        assert!(manager.ensure_not_reordering("undo").is_ok());

        manager.enter_reorder_mode(vec![entry("a.app")]);
        let err = manager.ensure_not_reordering("undo").unwrap_err();
        assert_eq!(err.to_string(), "cannot undo while reordering");

        manager.cancel_reorder();
        assert!(manager.ensure_not_reordering("undo").is_ok());
    }

    #[test]
    fn cancel_without_reorder_is_noop() {
        let (mut manager, view) = manager(&["a.app"]);
        manager.cancel_reorder();
        assert!(view.take().is_empty());
    }

    #[test]
    fn add_reaching_capacity_hides_add_button() {
        let (mut manager, view) = manager(&["a.app", "b.app", "c.app", "d.app"]);
        assert!(manager.add_item(usize::MAX, entry("e.app")));
        assert_eq!(
            view.take(),
            vec![
                ViewEvent::HideAddButton,
                ViewEvent::AddItem {
                    position: 4,
                    entry: entry("e.app")
                },
            ]
        );
    }

    #[test]
    fn remove_of_stale_package_keeps_identity_for_undo() {
        let (mut manager, _view) = manager(&["a.app", "gone.app"]);
        assert!(manager.remove_item(1));
        assert_eq!(
            manager.undo_entry().map(|removed| removed.entry.package_name.as_str()),
            Some("gone.app")
        );
        manager.undo_remove();
        assert_eq!(manager.package_names(), vec!["a.app", "gone.app"]);
        assert!(manager.undo_entry().is_none());
    }

    #[test]
    fn out_of_range_operations_leave_list_alone() {
        let (mut manager, view) = manager(&["a.app", "b.app"]);
        assert!(!manager.remove_item(2));
        manager.move_item(0, 5);
        assert!(!manager.select_from_picker(0));
        assert_eq!(manager.package_names(), vec!["a.app", "b.app"]);
        assert!(view.take().is_empty());
    }

    #[test]
    fn detached_manager_still_persists_but_reports_nothing() {
        let (mut manager, view) = manager(&["a.app"]);
        manager.detach();
        assert!(manager.add_item(0, entry("b.app")));
        manager.load_items();
        assert!(manager.open_picker().is_none());
        assert_eq!(manager.package_names(), vec!["b.app", "a.app"]);
        assert!(view.take().is_empty());
    }
}
