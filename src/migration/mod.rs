//! Migration lifecycle for generated project files
//!
//! Every migration upgrades one file of a previously generated project and
//! answers three lifecycle calls:
//!
//! - `up`: the forward migration. It asks the mediator whether it may run,
//!   checks that its file exists, looks for its trigger patterns in the file
//!   content and only then rewrites the file line by line.
//! - `down`: always called after `up`; notifies the mediator of completion.
//! - `allow_up`: re-enters `up` so the mediator can run a migration out of band.
//!
//! ## Adding a migration
//!
//! 1. Add a file with a struct implementing [`Migration`], usually delegating
//!    `up` to [`migrate_lines`] with its own triggers and rules
//! 2. Add a variant to [`MigrationKind`] and its factory call in `make`
//! 3. Register its target file in the manager's file table, in upgrade order
//!
//! ## Current migrations
//!
//! - **0.9.0** `defaults-config`: hard-coded `sveltinVersion` constant in
//!   `config/defaults.js.ts` becomes an import from `sveltin.json`
//! - **0.10.0** `svelte-config`: deprecated `trailingSlash` and
//!   `prerender.enabled` lines are dropped from `svelte.config.js`

mod defaults_config;
mod rewrite;
mod svelte_config;

pub use defaults_config::{DefaultsConfigMigration, VERSION_IMPORT_BLOCK};
pub use rewrite::migrate_lines;
pub(crate) use rewrite::read_content;
pub use svelte_config::SvelteConfigMigration;

use crate::error::Result;
use crate::services::MigrationServices;
use crate::version::Version;
use std::fmt;
use std::path::{Path, PathBuf};

/// Per-migration run parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationData {
    file_to_migrate: PathBuf,
    project_version: Version,
    target_version: Version,
}

impl MigrationData {
    pub fn new(
        file_to_migrate: impl Into<PathBuf>,
        project_version: Version,
        target_version: Version,
    ) -> Self {
        Self {
            file_to_migrate: file_to_migrate.into(),
            project_version,
            target_version,
        }
    }

    /// Same versions, different target file
    pub fn retarget(&self, file_to_migrate: impl Into<PathBuf>) -> Self {
        Self {
            file_to_migrate: file_to_migrate.into(),
            project_version: self.project_version.clone(),
            target_version: self.target_version.clone(),
        }
    }

    pub fn file_to_migrate(&self) -> &Path {
        &self.file_to_migrate
    }

    /// Version recorded when the project was generated
    pub fn project_version(&self) -> &Version {
        &self.project_version
    }

    /// Version of the running tool
    pub fn target_version(&self) -> &Version {
        &self.target_version
    }
}

/// Coordinator deciding eligibility and collecting completions
pub trait Mediator {
    /// Returns true if `migration` applies to the project being migrated
    fn can_run(&self, migration: &dyn Migration) -> bool;

    /// Record that the migration with `id` has finished
    fn notify_completion(&self, id: &str) -> Result<()>;
}

/// Everything a lifecycle call may use
#[derive(Clone, Copy)]
pub struct MigrationContext<'a> {
    pub services: &'a MigrationServices,
    pub mediator: &'a dyn Mediator,
}

impl<'a> MigrationContext<'a> {
    pub fn new(services: &'a MigrationServices, mediator: &'a dyn Mediator) -> Self {
        Self { services, mediator }
    }
}

/// Why a migration left its file alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The project already has the version that introduced the migration
    NotEligible,
    /// The target file was never created
    FileMissing,
    /// No trigger pattern found; the file is already current
    UpToDate,
}

/// Result of one migration's `up`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Migrated,
    /// Triggers matched but the run is a dry run
    WouldMigrate,
    Skipped(SkipReason),
}

impl Outcome {
    pub fn is_migrated(&self) -> bool {
        matches!(self, Outcome::Migrated)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Migrated => f.write_str("migrated"),
            Outcome::WouldMigrate => f.write_str("needs migration"),
            Outcome::Skipped(SkipReason::NotEligible) => f.write_str("skipped (not eligible)"),
            Outcome::Skipped(SkipReason::FileMissing) => f.write_str("skipped (file missing)"),
            Outcome::Skipped(SkipReason::UpToDate) => f.write_str("up to date"),
        }
    }
}

/// One version-scoped upgrade of a single project file
pub trait Migration {
    /// Stable identifier, e.g. `svelte-config`
    fn id(&self) -> &'static str;

    /// Tool version that introduced the change this migration applies
    fn introduced_in(&self) -> Version;

    fn data(&self) -> &MigrationData;

    /// Forward migration
    fn up(&self, ctx: &MigrationContext<'_>) -> Result<Outcome>;

    /// Post-processing, called after every `up`
    fn down(&self, ctx: &MigrationContext<'_>) -> Result<()> {
        ctx.mediator.notify_completion(self.id())
    }

    /// Out-of-band entry point for the mediator
    fn allow_up(&self, ctx: &MigrationContext<'_>) -> Result<Outcome> {
        self.up(ctx)
    }

    /// Run `up` then `down`
    fn execute(&self, ctx: &MigrationContext<'_>) -> Result<Outcome> {
        let outcome = self.up(ctx)?;
        self.down(ctx)?;
        Ok(outcome)
    }
}

/// Built-in migrations, in upgrade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationKind {
    DefaultsConfig,
    SvelteConfig,
}

impl MigrationKind {
    pub const ALL: [MigrationKind; 2] = [MigrationKind::DefaultsConfig, MigrationKind::SvelteConfig];

    pub fn id(&self) -> &'static str {
        match self {
            MigrationKind::DefaultsConfig => DefaultsConfigMigration::ID,
            MigrationKind::SvelteConfig => SvelteConfigMigration::ID,
        }
    }

    /// Build the migration through its own factory
    pub fn make(self, data: MigrationData) -> Box<dyn Migration> {
        match self {
            MigrationKind::DefaultsConfig => DefaultsConfigMigration::make(data),
            MigrationKind::SvelteConfig => SvelteConfigMigration::make(data),
        }
    }
}
