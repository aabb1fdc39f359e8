//! The two enumeration pipelines that leave the UI thread.
//!
//! A job is prepared by the list manager on the UI thread, `run()` on any
//! worker, and its outcome handed back to the manager. Jobs are never
//! cancelled; an outcome that arrives after the view it was started for has
//! been detached is dropped by the manager.

use std::{collections::HashSet, sync::Arc};

use log::debug;

use crate::{
    catalog::{is_system_package, AppCatalog},
    error::CatalogError,
    models::ShortcutEntry,
};

/// Upper bound on packages seeded on first run.
pub const MAX_DUMMY_ITEMS: usize = 5;

/// Builds the picker contents.
pub struct PickerJob {
    pub(crate) generation: u64,
    pub(crate) catalog: Arc<dyn AppCatalog>,
    pub(crate) exclude: HashSet<String>,
}

pub struct PickerOutcome {
    pub(crate) generation: u64,
    pub result: Result<Vec<ShortcutEntry>, CatalogError>,
}

impl PickerJob {
    pub fn run(self) -> PickerOutcome {
        PickerOutcome {
            generation: self.generation,
            result: build_picker_entries(self.catalog.as_ref(), &self.exclude),
        }
    }
}

/// Installed user packages not in `exclude`, resolved and sorted by display
/// name (ordinal, case-sensitive).
pub fn build_picker_entries(
    catalog: &dyn AppCatalog,
    exclude: &HashSet<String>,
) -> Result<Vec<ShortcutEntry>, CatalogError> {
    let installed = catalog.list_installed()?;
    let total = installed.len();

    let mut entries: Vec<ShortcutEntry> = installed
        .into_iter()
        .filter(|info| !(is_system_package(info) && !info.package_name.is_empty()))
        .filter(|info| !exclude.contains(&info.package_name))
        .filter_map(|info| catalog.resolve(&info.package_name))
        .filter(ShortcutEntry::is_complete)
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("picker: {} of {total} installed packages offered", entries.len());
    Ok(entries)
}

/// Finds the first-run shortcuts.
pub struct SeedJob {
    pub(crate) generation: u64,
    pub(crate) catalog: Arc<dyn AppCatalog>,
    pub(crate) candidates: Vec<String>,
}

pub struct SeedOutcome {
    pub(crate) generation: u64,
    pub result: Result<Vec<String>, CatalogError>,
}

impl SeedJob {
    pub fn run(self) -> SeedOutcome {
        let result = self
            .catalog
            .list_installed()
            .map(|installed| {
                let installed: HashSet<String> =
                    installed.into_iter().map(|info| info.package_name).collect();
                pick_seed_packages(&self.candidates, &installed)
            });
        SeedOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// The first [`MAX_DUMMY_ITEMS`] installed candidates, in candidate order.
pub fn pick_seed_packages(candidates: &[String], installed: &HashSet<String>) -> Vec<String> {
    let mut picked: Vec<String> = Vec::new();
    for candidate in candidates {
        if picked.len() >= MAX_DUMMY_ITEMS {
            break;
        }
        if installed.contains(candidate) && !picked.contains(candidate) {
            picked.push(candidate.clone());
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogApp, MemoryCatalog};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn seed_keeps_candidate_order() {
        let candidates = names(&["x", "y", "z", "w", "v"]);
        let installed: HashSet<String> = names(&["w", "q", "y"]).into_iter().collect();
        assert_eq!(pick_seed_packages(&candidates, &installed), names(&["y", "w"]));
    }

    #[test]
    fn seed_is_capped_and_deduplicated() {
        let candidates = names(&["a", "a", "b", "c", "d", "e", "f", "g"]);
        let installed: HashSet<String> = candidates.iter().cloned().collect();
        assert_eq!(
            pick_seed_packages(&candidates, &installed),
            names(&["a", "b", "c", "d", "e"])
        );
    }

    #[test]
    fn picker_filters_and_sorts_ordinally() {
        let mut iconless = CatalogApp::user("d.app", "Dull");
        iconless.icon_b64.clear();
        let catalog = MemoryCatalog::new(vec![
            CatalogApp::user("b.app", "banana"),
            CatalogApp::user("a.app", "Zebra"),
            CatalogApp::user("c.app", "Apple"),
            CatalogApp::system("com.android.phone", "Phone"),
            CatalogApp::user("chosen.app", "Chosen"),
            iconless,
        ]);
        let exclude: HashSet<String> = names(&["chosen.app"]).into_iter().collect();

        let offered: Vec<String> = build_picker_entries(&catalog, &exclude)
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(offered, names(&["Apple", "Zebra", "banana"]));
    }

    #[test]
    fn picker_propagates_enumeration_failure() {
        let catalog = MemoryCatalog::new(Vec::new());
        catalog.set_unavailable(true);
        assert!(build_picker_entries(&catalog, &HashSet::new()).is_err());
    }
}
