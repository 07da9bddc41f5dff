//! Sveltin Migration Library
//!
//! Upgrades the configuration and scaffold files of a previously generated
//! Sveltin project as the tool evolves. Each migration targets one file, is
//! scoped to the tool version that introduced it and only rewrites the file
//! when it still contains outdated content, so running the whole pipeline on
//! an already-migrated project is a no-op.
//!
//! # Architecture
//!
//! - **Mediator**: [`MigrationManager`] - Ordered registry, version gate and completion tracking
//! - **Migrations**: [`migration`] module - Lifecycle contract and the concrete migrations
//! - **Rewrite engine**: [`patterns`] and [`rules`] modules - Trigger detection and line rules
//! - **Plumbing**: [`fs`], [`services`], [`project`] and [`config`] modules
//!
//! # Example
//!
//! ```no_run
//! use sveltin_migrate::{RunOptions, run};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let report = run("./my-site", &RunOptions::default())?;
//!     println!("migrated: {:?}", report.migrated());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod manager;
pub mod migration;
pub mod patterns;
pub mod project;
pub mod rules;
pub mod services;
pub mod version;

use std::path::{Path, PathBuf};
use tracing::debug;

// Re-export commonly used types
pub use config::Settings;
pub use error::{MigrationError, Result};
pub use manager::{MigrationManager, MigrationReport, RunState};
pub use migration::{Migration, MigrationData, Outcome, SkipReason};
pub use project::ProjectLayout;
pub use services::{MigrationServices, Reporter, TracingReporter};
pub use version::Version;

/// Options for [`run`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Use this instead of the version recorded in the project
    pub project_version: Option<Version>,
    /// Use this instead of the running tool's version
    pub target_version: Option<Version>,
    /// Force a dry run regardless of the settings file
    pub dry_run: bool,
    /// Settings file to use instead of the project's `sveltin-migrate.toml`
    pub config: Option<PathBuf>,
}

/// Migrate the project at `project_root` on the real filesystem
///
/// # Arguments
///
/// * `project_root` - Root folder of the generated project
/// * `options` - Version and settings overrides
///
/// # Returns
///
/// The per-migration outcomes, or the first error encountered
pub fn run(project_root: impl AsRef<Path>, options: &RunOptions) -> Result<MigrationReport> {
    let fs = fs::OsFileSystem::new();
    let layout = ProjectLayout::new(project_root);

    let settings = Settings::discover(&fs, options.config.as_deref(), &layout)?;
    let services = MigrationServices::os(settings.pattern_registry()?)
        .with_dry_run(settings.dry_run || options.dry_run);

    let project_version = match &options.project_version {
        Some(version) => version.clone(),
        None => layout.detect_version(services.fs(), services.patterns())?,
    };
    let target_version = options
        .target_version
        .clone()
        .unwrap_or_else(version::tool_version);
    debug!(%project_version, %target_version, root = %layout.root().display(), "starting migrations");

    let data = MigrationData::new(layout.root(), project_version, target_version);
    MigrationManager::new(&services, &data).run()
}
