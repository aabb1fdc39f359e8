use std::{fs, path::Path, sync::RwLock};

use serde::{Deserialize, Serialize};

use crate::{
    error::CatalogError,
    models::{InstalledApp, ShortcutEntry, FLAG_SYSTEM},
};

/// Read-only view of the platform's installed-application registry.
pub trait AppCatalog: Send + Sync {
    /// Every installed package, in no particular order. Reflects live state.
    fn list_installed(&self) -> Result<Vec<InstalledApp>, CatalogError>;

    /// Display metadata for `package_name`, or `None` when the package is gone
    /// or its label or icon cannot be resolved.
    fn resolve(&self, package_name: &str) -> Option<ShortcutEntry>;

    /// Resolves `package_names` in order, skipping the ones that no longer resolve.
    fn resolve_all(&self, package_names: &[String]) -> Vec<ShortcutEntry> {
        package_names
            .iter()
            .filter_map(|name| self.resolve(name))
            .collect()
    }
}

pub fn is_system_package(info: &InstalledApp) -> bool {
    info.flags & FLAG_SYSTEM != 0
}

/// A package known to a [`MemoryCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogApp {
    pub package_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon_b64: String,
    #[serde(default)]
    pub flags: u32,
}

impl CatalogApp {
    pub fn user(package_name: &str, name: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            name: name.to_string(),
            icon_b64: format!("icon:{package_name}"),
            flags: 0,
        }
    }

    pub fn system(package_name: &str, name: &str) -> Self {
        Self {
            flags: FLAG_SYSTEM,
            ..Self::user(package_name, name)
        }
    }
}

/// Registry held in memory. Backs the desktop shell (loaded from a JSON
/// fixture) and the tests.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    apps: RwLock<Vec<CatalogApp>>,
    unavailable: RwLock<bool>,
}

impl MemoryCatalog {
    pub fn new(apps: Vec<CatalogApp>) -> Self {
        Self {
            apps: RwLock::new(apps),
            unavailable: RwLock::new(false),
        }
    }

    /// Reads a JSON array of [`CatalogApp`] objects.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let apps: Vec<CatalogApp> = serde_json::from_str(&content)?;
        Ok(Self::new(apps))
    }

    pub fn install(&self, app: CatalogApp) {
        if let Ok(mut apps) = self.apps.write() {
            apps.retain(|existing| existing.package_name != app.package_name);
            apps.push(app);
        }
    }

    pub fn uninstall(&self, package_name: &str) {
        if let Ok(mut apps) = self.apps.write() {
            apps.retain(|app| app.package_name != package_name);
        }
    }

    /// Makes every subsequent enumeration fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.unavailable.write() {
            *flag = unavailable;
        }
    }
}

impl AppCatalog for MemoryCatalog {
    fn list_installed(&self) -> Result<Vec<InstalledApp>, CatalogError> {
        if self.unavailable.read().map(|flag| *flag).unwrap_or(false) {
            return Err(CatalogError::Unavailable("registry offline".into()));
        }
        let apps = self
            .apps
            .read()
            .map_err(|_| CatalogError::Query("catalog lock poisoned".into()))?;
        Ok(apps
            .iter()
            .map(|app| InstalledApp::new(app.package_name.clone(), app.flags))
            .collect())
    }

    fn resolve(&self, package_name: &str) -> Option<ShortcutEntry> {
        let apps = self.apps.read().ok()?;
        let app = apps.iter().find(|app| app.package_name == package_name)?;
        if app.name.is_empty() || app.icon_b64.is_empty() {
            return None;
        }
        Some(ShortcutEntry::new(
            app.package_name.clone(),
            app.name.clone(),
            app.icon_b64.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_flag_is_detected() {
        assert!(is_system_package(&InstalledApp::new("android", FLAG_SYSTEM)));
        assert!(is_system_package(&InstalledApp::new("android", FLAG_SYSTEM | 0x80)));
        assert!(!is_system_package(&InstalledApp::new("a.app", 0x80)));
    }

    #[test]
    fn resolve_requires_label_and_icon() {
        let mut no_icon = CatalogApp::user("b.app", "B");
        no_icon.icon_b64.clear();
        let catalog = MemoryCatalog::new(vec![
            CatalogApp::user("a.app", "A"),
            no_icon,
            CatalogApp::user("c.app", ""),
        ]);

        assert_eq!(catalog.resolve("a.app").map(|e| e.name), Some("A".into()));
        assert_eq!(catalog.resolve("b.app"), None);
        assert_eq!(catalog.resolve("c.app"), None);
        assert_eq!(catalog.resolve("missing.app"), None);
    }

    #[test]
    fn resolve_all_keeps_order_and_skips_stale() {
        let catalog = MemoryCatalog::new(vec![
            CatalogApp::user("a.app", "A"),
            CatalogApp::user("c.app", "C"),
        ]);
        let names = vec!["c.app".to_string(), "gone.app".into(), "a.app".into()];
        let resolved: Vec<_> = catalog
            .resolve_all(&names)
            .into_iter()
            .map(|e| e.package_name)
            .collect();
        assert_eq!(resolved, vec!["c.app", "a.app"]);
    }

    #[test]
    fn unavailable_catalog_fails_enumeration() {
        let catalog = MemoryCatalog::new(vec![CatalogApp::user("a.app", "A")]);
        catalog.set_unavailable(true);
        assert!(catalog.list_installed().is_err());
        catalog.set_unavailable(false);
        assert_eq!(catalog.list_installed().unwrap().len(), 1);
    }

    #[test]
    fn fixture_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        fs::write(
            &path,
            r#"[{ "packageName": "a.app", "name": "A", "iconB64": "x" },
                { "packageName": "android", "flags": 1 }]"#,
        )
        .unwrap();

        let catalog = MemoryCatalog::from_file(&path).unwrap();
        let installed = catalog.list_installed().unwrap();
        assert_eq!(installed.len(), 2);
        assert!(is_system_package(&installed[1]));
        assert_eq!(catalog.resolve("android"), None);
    }
}
