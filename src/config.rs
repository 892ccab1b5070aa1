//! Resolver configuration loader describing which rule attributes declare assets.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::assets::{AssetAttributes, DEFAULT_DIR_ATTR, DEFAULT_FILES_ATTR};

/// File name searched for when discovering configuration in a directory.
pub const DEFAULT_CONFIG_FILE: &str = "asset_roots.config.json";

/// Discoverable configuration for asset resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Name of the label-list attribute that lists asset-producing targets.
    pub files_attribute: String,
    /// Name of the string attribute holding the asset base directory.
    pub dir_attribute: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            files_attribute: DEFAULT_FILES_ATTR.into(),
            dir_attribute: DEFAULT_DIR_ATTR.into(),
        }
    }
}

impl ResolverConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// A missing or unreadable configuration file falls back to the default attribute names.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Convert the configuration into the attribute names used by the resolver.
    pub fn into_attributes(self) -> AssetAttributes {
        AssetAttributes {
            files: self.files_attribute,
            dir: self.dir_attribute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discover_defaults_without_config_file() {
        let temp = tempdir().expect("failed to create temp dir");
        let config = ResolverConfig::discover(temp.path());
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.into_attributes(), AssetAttributes::default());
    }

    #[test]
    fn discover_reads_partial_overrides() {
        let temp = tempdir().expect("failed to create temp dir");
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            r#"{"files_attribute": "resources"}"#,
        )
        .expect("failed to write config");

        let attributes = ResolverConfig::discover(temp.path()).into_attributes();
        assert_eq!(attributes.files, "resources");
        assert_eq!(attributes.dir, "assets_dir");
    }

    #[test]
    fn from_path_rejects_invalid_json() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").expect("failed to write config");

        assert!(ResolverConfig::from_path(&path).is_none());
        assert_eq!(ResolverConfig::discover(temp.path()), ResolverConfig::default());
    }
}
