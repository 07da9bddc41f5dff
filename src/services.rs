//! Shared services handed to every migration
//!
//! One `MigrationServices` value is created per run and borrowed by every
//! migration. Migrations only use it; they never mutate it.

use crate::fs::{FileSystem, OsFileSystem};
use crate::patterns::PatternRegistry;
use std::sync::Arc;

/// Sink for the user-facing progress messages of a run
pub trait Reporter {
    fn info(&self, message: &str);
}

/// Reporter forwarding messages to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Filesystem, reporter and trigger patterns shared by one run
pub struct MigrationServices {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
    patterns: PatternRegistry,
    dry_run: bool,
}

impl MigrationServices {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        reporter: Arc<dyn Reporter>,
        patterns: PatternRegistry,
    ) -> Self {
        Self {
            fs,
            reporter,
            patterns,
            dry_run: false,
        }
    }

    /// Services backed by the real filesystem and `tracing`
    pub fn os(patterns: PatternRegistry) -> Self {
        Self::new(Arc::new(OsFileSystem::new()), Arc::new(TracingReporter), patterns)
    }

    /// Detect and report outdated files without rewriting them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
