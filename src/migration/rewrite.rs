//! Forward-migration flow shared by line-based migrations

use super::{Migration, MigrationContext, Outcome, SkipReason};
use crate::error::{MigrationError, Result};
use crate::fs::FileSystem;
use crate::patterns::{PatternKey, PatternRegistry};
use crate::rules::{Rule, rewrite_lines};
use std::path::Path;
use tracing::debug;

/// Run the `up` steps of a line-based migration
///
/// 1. Ask the mediator whether `migration` may run
/// 2. Skip if its file does not exist
/// 3. Read the file and look for any of `triggers` in the raw content
/// 4. Rewrite the file line by line with the rules built by `rules`, replacing it atomically
///
/// A refused gate, a missing file and an absent trigger are all successful
/// no-ops. The reporter is called once, and only when the file changes: a
/// trigger that matches while the rules leave every line as it was is
/// reported as `UpToDate` without a message.
///
/// # Arguments
///
/// * `migration` - Migration being run, provides the target file and version
/// * `ctx` - Services and mediator of the current run
/// * `triggers` - Patterns whose presence means the file is outdated
/// * `rules` - Builds the migration's rules from the run's pattern registry
pub fn migrate_lines<F>(
    migration: &dyn Migration,
    ctx: &MigrationContext<'_>,
    triggers: &[PatternKey],
    rules: F,
) -> Result<Outcome>
where
    F: FnOnce(&PatternRegistry) -> Vec<Rule>,
{
    let path = migration.data().file_to_migrate();

    if !ctx.mediator.can_run(migration) {
        debug!(migration = migration.id(), "not eligible for this project version");
        return Ok(Outcome::Skipped(SkipReason::NotEligible));
    }

    let services = ctx.services;
    let exists = services
        .fs()
        .exists(path)
        .map_err(|source| MigrationError::Exists {
            path: path.to_path_buf(),
            source,
        })?;
    if !exists {
        debug!(migration = migration.id(), path = %path.display(), "file not found");
        return Ok(Outcome::Skipped(SkipReason::FileMissing));
    }

    let content = read_content(services.fs(), path)?;
    if !services.patterns().any_match(triggers, &content) {
        debug!(migration = migration.id(), path = %path.display(), "already up to date");
        return Ok(Outcome::Skipped(SkipReason::UpToDate));
    }

    let output = rewrite_lines(&content, &rules(services.patterns()));
    if output == content {
        debug!(migration = migration.id(), path = %path.display(), "no rule matched a single line");
        return Ok(Outcome::Skipped(SkipReason::UpToDate));
    }

    let name = display_name(path);
    if services.dry_run() {
        services.reporter().info(&format!("Would migrate {}", name));
        return Ok(Outcome::WouldMigrate);
    }

    services.reporter().info(&format!("Migrating {}", name));
    services
        .fs()
        .replace(path, output.as_bytes())
        .map_err(|source| MigrationError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Outcome::Migrated)
}

/// Read a whole file as UTF-8
pub(crate) fn read_content(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let bytes = fs.read(path).map_err(|source| MigrationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| MigrationError::Encoding {
        path: path.to_path_buf(),
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
