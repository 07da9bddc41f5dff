//! Settings file
//!
//! Settings are optional and read from TOML:
//!
//! ```toml
//! dry_run = false
//!
//! [patterns]
//! trailing_slash = { regex = "^\\s*trailingSlash:.*$" }
//! prerender_enabled = { literal = "enabled: true," }
//! ```

use crate::error::{MigrationError, Result};
use crate::fs::FileSystem;
use crate::migration::read_content;
use crate::patterns::{PatternRegistry, PatternSource};
use crate::project::ProjectLayout;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Tool settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Report outdated files without rewriting them
    pub dry_run: bool,
    /// Trigger pattern overrides keyed by pattern name
    pub patterns: BTreeMap<String, PatternSource>,
}

impl Settings {
    /// Parse settings from TOML text; `path` is only used in error messages
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| MigrationError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from a file that must exist
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = read_content(fs, path)?;
        Self::from_toml_str(&content, path)
    }

    /// Load `explicit` if given, otherwise the project's settings file if present
    ///
    /// # Returns
    ///
    /// The loaded settings, or the defaults when there is nothing to load
    pub fn discover(fs: &dyn FileSystem, explicit: Option<&Path>, layout: &ProjectLayout) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(fs, path);
        }

        let path = layout.settings();
        let exists = fs.exists(&path).map_err(|source| MigrationError::Exists {
            path: path.clone(),
            source,
        })?;
        if exists {
            Self::load(fs, &path)
        } else {
            Ok(Self::default())
        }
    }

    /// Pattern registry with this file's overrides applied
    pub fn pattern_registry(&self) -> Result<PatternRegistry> {
        PatternRegistry::with_overrides(&self.patterns)
    }
}
