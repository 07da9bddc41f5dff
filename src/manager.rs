//! Migration manager
//!
//! The manager is the mediator of a run. It owns the ordered registry of
//! migrations, decides which of them apply to the project's recorded version
//! and tracks their completion. Registry order is execution order: a later
//! migration may rely on an earlier one having already normalized its file.
//!
//! A run stops at the first failing migration. Files rewritten before the
//! failure stay rewritten; re-running is safe because every migration checks
//! its triggers before touching a file.

use crate::error::{MigrationError, Result};
use crate::migration::{Mediator, Migration, MigrationContext, MigrationData, MigrationKind, Outcome};
use crate::project::{DEFAULTS_CONFIG_FILE, SVELTE_CONFIG_FILE};
use crate::services::MigrationServices;
use crate::version::Version;
use std::cell::{Cell, RefCell};
use tracing::{debug, warn};

/// File each built-in migration targets, relative to the project root, in execution order
pub const MIGRATION_FILES: [(MigrationKind, &str); 2] = [
    (MigrationKind::DefaultsConfig, DEFAULTS_CONFIG_FILE),
    (MigrationKind::SvelteConfig, SVELTE_CONFIG_FILE),
];

/// Returns true if a migration introduced in `introduced_in` applies
///
/// The project must predate the migration, and the running tool must already
/// know about it.
pub fn is_eligible(introduced_in: &Version, project_version: &Version, target_version: &Version) -> bool {
    project_version < introduced_in && introduced_in <= target_version
}

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// Outcome of every migration of a successful run, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    outcomes: Vec<(&'static str, Outcome)>,
}

impl MigrationReport {
    pub fn outcomes(&self) -> &[(&'static str, Outcome)] {
        &self.outcomes
    }

    pub fn outcome(&self, id: &str) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|(migration, _)| *migration == id)
            .map(|(_, outcome)| *outcome)
    }

    /// Ids of the migrations that rewrote their file
    pub fn migrated(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_migrated())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns true if no file was (or, in a dry run, would be) rewritten
    pub fn is_noop(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, Outcome::Skipped(_)))
    }
}

/// Mediator running migrations in registry order
pub struct MigrationManager<'a> {
    services: &'a MigrationServices,
    project_version: Version,
    target_version: Version,
    migrations: Vec<Box<dyn Migration>>,
    state: Cell<RunState>,
    completed: RefCell<Vec<String>>,
}

impl<'a> MigrationManager<'a> {
    /// Create a manager with every built-in migration
    ///
    /// # Arguments
    ///
    /// * `services` - Services shared by all migrations
    /// * `data` - Project root as `file_to_migrate`, plus project and target versions
    pub fn new(services: &'a MigrationServices, data: &MigrationData) -> Self {
        let root = data.file_to_migrate();
        let migrations = MIGRATION_FILES
            .iter()
            .map(|(kind, file)| kind.make(data.retarget(root.join(file))))
            .collect();
        Self::with_migrations(services, data, migrations)
    }

    /// Create a manager with a custom ordered registry
    pub fn with_migrations(
        services: &'a MigrationServices,
        data: &MigrationData,
        migrations: Vec<Box<dyn Migration>>,
    ) -> Self {
        Self {
            services,
            project_version: data.project_version().clone(),
            target_version: data.target_version().clone(),
            migrations,
            state: Cell::new(RunState::NotStarted),
            completed: RefCell::new(Vec::new()),
        }
    }

    /// Registered migrations in execution order
    pub fn migrations(&self) -> impl Iterator<Item = &(dyn Migration + 'static)> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// Ids of the migrations that completed in the current or last run
    pub fn completed(&self) -> Vec<String> {
        self.completed.borrow().clone()
    }

    /// Execute every migration in order, stopping at the first error
    pub fn run(&self) -> Result<MigrationReport> {
        self.state.set(RunState::Running);
        self.completed.borrow_mut().clear();

        let ctx = MigrationContext::new(self.services, self);
        let mut report = MigrationReport::default();
        for migration in &self.migrations {
            match migration.execute(&ctx) {
                Ok(outcome) => {
                    debug!(migration = migration.id(), %outcome, "migration finished");
                    report.outcomes.push((migration.id(), outcome));
                }
                Err(e) => {
                    warn!(migration = migration.id(), "migration failed: {}", e);
                    self.state.set(RunState::Failed);
                    return Err(e);
                }
            }
        }

        self.state.set(RunState::Completed);
        Ok(report)
    }

    /// Run a single registered migration out of band through `allow_up`
    ///
    /// # Returns
    ///
    /// The migration's outcome, or `None` if no migration has this id
    pub fn allow(&self, id: &str) -> Result<Option<Outcome>> {
        let ctx = MigrationContext::new(self.services, self);
        self.migrations
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.allow_up(&ctx))
            .transpose()
    }
}

impl Mediator for MigrationManager<'_> {
    fn can_run(&self, migration: &dyn Migration) -> bool {
        is_eligible(
            &migration.introduced_in(),
            &self.project_version,
            &self.target_version,
        )
    }

    fn notify_completion(&self, id: &str) -> Result<()> {
        if self.state.get() != RunState::Running {
            return Err(MigrationError::Completion(id.to_string()));
        }
        let mut completed = self.completed.borrow_mut();
        if completed.iter().any(|done| done == id) {
            return Err(MigrationError::Completion(id.to_string()));
        }
        completed.push(id.to_string());
        Ok(())
    }
}
