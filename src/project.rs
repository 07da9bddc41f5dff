//! Project layout and recorded version
//!
//! Knows where a generated project keeps the files the migrations touch, and
//! which Sveltin version generated the project.

use crate::error::{MigrationError, Result};
use crate::fs::FileSystem;
use crate::migration::read_content;
use crate::patterns::{PatternKey, PatternRegistry};
use crate::version::{Version, parse_version};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Defaults file, relative to the project root
pub const DEFAULTS_CONFIG_FILE: &str = "config/defaults.js.ts";
/// SvelteKit config, relative to the project root
pub const SVELTE_CONFIG_FILE: &str = "svelte.config.js";
/// Project metadata written by Sveltin 0.9.0 and later
pub const METADATA_FILE: &str = "sveltin.json";
/// Optional settings for this tool
pub const SETTINGS_FILE: &str = "sveltin-migrate.toml";

#[derive(Debug, Deserialize)]
struct ProjectMetadata {
    sveltin: SveltinSection,
}

#[derive(Debug, Deserialize)]
struct SveltinSection {
    version: String,
}

/// Paths of a generated project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn defaults_config(&self) -> PathBuf {
        self.path(DEFAULTS_CONFIG_FILE)
    }

    pub fn svelte_config(&self) -> PathBuf {
        self.path(SVELTE_CONFIG_FILE)
    }

    pub fn metadata(&self) -> PathBuf {
        self.path(METADATA_FILE)
    }

    pub fn settings(&self) -> PathBuf {
        self.path(SETTINGS_FILE)
    }

    /// Detect the Sveltin version that generated the project
    ///
    /// Looks at `sveltin.json` first, then at the hard-coded version constant
    /// older releases wrote into the defaults file. Projects with neither are
    /// treated as `0.0.0`, which makes every migration eligible; their trigger
    /// checks still keep current files untouched.
    pub fn detect_version(&self, fs: &dyn FileSystem, patterns: &PatternRegistry) -> Result<Version> {
        let metadata_path = self.metadata();
        if exists(fs, &metadata_path)? {
            let content = read_content(fs, &metadata_path)?;
            let metadata: ProjectMetadata =
                serde_json::from_str(&content).map_err(|source| MigrationError::Metadata {
                    path: metadata_path.clone(),
                    source,
                })?;
            return parse_version(&metadata.sveltin.version);
        }

        let defaults_path = self.defaults_config();
        if exists(fs, &defaults_path)? {
            let content = read_content(fs, &defaults_path)?;
            if let Some(version) = patterns
                .get(PatternKey::SemVersion)
                .capture(&content, "version")
            {
                return parse_version(version);
            }
        }

        debug!(root = %self.root.display(), "no recorded version, assuming 0.0.0");
        Ok(Version::new(0, 0, 0))
    }
}

fn exists(fs: &dyn FileSystem, path: &Path) -> Result<bool> {
    fs.exists(path).map_err(|source| MigrationError::Exists {
        path: path.to_path_buf(),
        source,
    })
}
