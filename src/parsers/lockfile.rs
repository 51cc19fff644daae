//! package-lock.json model
//!
//! Only the fields needed to pin a version are decoded. Version 1 lock files
//! key entries by package name under `dependencies`; versions 2 and 3 key
//! them by install path under `packages`. Version 2 files carry both.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// File name npm writes next to package.json
pub const LOCK_FILE: &str = "package-lock.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockFile {
    #[serde(default)]
    pub lockfile_version: Option<u32>,
    #[serde(default)]
    pub dependencies: HashMap<String, LockEntry>,
    #[serde(default)]
    pub packages: HashMap<String, LockEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockEntry {
    #[serde(default)]
    pub version: Option<String>,
}

impl LockEntry {
    fn pinned(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }
}

impl LockFile {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Reads the lock file next to `manifest`.
    ///
    /// A missing file yields `None` silently; a corrupt one is logged and
    /// treated as missing.
    pub fn load_sibling(manifest: &Path) -> Option<Self> {
        let path = manifest.parent()?.join(LOCK_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        match Self::from_json(&content) {
            Ok(lock) => {
                tracing::debug!(
                    "Loaded {} (lockfileVersion {:?})",
                    path.display(),
                    lock.lockfile_version
                );
                Some(lock)
            }
            Err(e) => {
                tracing::warn!("Could not parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Version installed for `name`, declared in package.json as `spec`
    pub fn resolve(&self, name: &str, spec: &str) -> Option<&str> {
        if let Some(version) = self.dependencies.get(name).and_then(LockEntry::pinned) {
            return Some(version);
        }

        let spec = spec.trim();
        let candidates = [
            format!("node_modules/{name}"),
            format!("node_modules/{name}@{spec}"),
            format!("node_modules/{name}@{}", spec.trim_start_matches('^')),
            format!("node_modules/{name}@{}", spec.trim_start_matches('~')),
        ];
        candidates
            .iter()
            .find_map(|key| self.packages.get(key).and_then(LockEntry::pinned))
    }
}
