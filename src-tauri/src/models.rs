use serde::{Deserialize, Serialize};

/// `ApplicationInfo.FLAG_SYSTEM` on Android.
pub const FLAG_SYSTEM: u32 = 1 << 0;

/// A package as reported by the platform registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub package_name: String,
    #[serde(default)]
    pub flags: u32,
}

impl InstalledApp {
    pub fn new(package_name: impl Into<String>, flags: u32) -> Self {
        Self {
            package_name: package_name.into(),
            flags,
        }
    }
}

/// A chosen application as presented to the user. Only `package_name` is
/// persisted; `name` and `icon_b64` are re-resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutEntry {
    pub package_name: String,
    pub name: String,
    pub icon_b64: String,
}

impl ShortcutEntry {
    pub fn new(
        package_name: impl Into<String>,
        name: impl Into<String>,
        icon_b64: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            name: name.into(),
            icon_b64: icon_b64.into(),
        }
    }

    /// Entry for a package that no longer resolves. Carries the identity so it
    /// can still be re-inserted by undo.
    pub fn unresolved(package_name: impl Into<String>) -> Self {
        Self::new(package_name, String::new(), String::new())
    }

    pub fn is_complete(&self) -> bool {
        !self.package_name.is_empty() && !self.name.is_empty() && !self.icon_b64.is_empty()
    }
}

/// Single-slot undo buffer content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry {
    pub position: usize,
    pub entry: ShortcutEntry,
}
