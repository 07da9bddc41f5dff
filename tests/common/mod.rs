//! Common test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use sveltin_migrate::fs::MemoryFileSystem;
use sveltin_migrate::patterns::PatternRegistry;
use sveltin_migrate::{MigrationData, MigrationServices, Reporter, Version};
use tempfile::TempDir;

pub const ROOT: &str = "/site";
pub const DEFAULTS_PATH: &str = "/site/config/defaults.js.ts";
pub const SVELTE_CONFIG_PATH: &str = "/site/svelte.config.js";

/// Defaults file as generated by Sveltin 0.8
pub const LEGACY_DEFAULTS: &str = "const sveltinVersion = '0.8.4';

const name = 'My Sveltin Site';
const baseURL = 'https://example.com';

export { sveltinVersion, name, baseURL };
";

/// SvelteKit config as generated before 0.10
pub const LEGACY_SVELTE_CONFIG: &str = "import preprocess from 'svelte-preprocess';
import adapter from '@sveltejs/adapter-static';

/** @type {import('@sveltejs/kit').Config} */
const config = {
\tpreprocess: [preprocess()],
\tkit: {
\t\tadapter: adapter({
\t\t\tpages: 'build',
\t\t\tassets: 'build',
\t\t\tfallback: null,
\t\t}),
\t\ttrailingSlash: 'always',
\t\tprerender: {
\t\t\tenabled: true,
\t\t\tentries: ['*'],
\t\t},
\t},
};

export default config;
";

/// Expected config after migration: deprecated lines blanked, everything else in place
pub fn migrated_svelte_config() -> String {
    LEGACY_SVELTE_CONFIG
        .replace("\t\ttrailingSlash: 'always',", "")
        .replace("\t\t\tenabled: true,", "")
}

/// Reporter recording every message
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// In-memory project with shared services
pub struct TestProject {
    pub fs: Arc<MemoryFileSystem>,
    pub reporter: Arc<RecordingReporter>,
    pub services: MigrationServices,
}

impl TestProject {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Empty project whose services only report outdated files
    pub fn dry_run() -> Self {
        Self::build(true)
    }

    fn build(dry_run: bool) -> Self {
        let fs = Arc::new(MemoryFileSystem::new());
        let reporter = Arc::new(RecordingReporter::default());
        let services = MigrationServices::new(
            fs.clone(),
            reporter.clone(),
            PatternRegistry::builtin().unwrap(),
        )
        .with_dry_run(dry_run);
        Self {
            fs,
            reporter,
            services,
        }
    }

    /// Project with both legacy files in place
    pub fn legacy() -> Self {
        let project = Self::new();
        project.fs.insert(DEFAULTS_PATH, LEGACY_DEFAULTS);
        project.fs.insert(SVELTE_CONFIG_PATH, LEGACY_SVELTE_CONFIG);
        project
    }

    pub fn content(&self, path: &str) -> String {
        self.fs.contents_string(path).unwrap()
    }
}

/// Run parameters for the in-memory project root
pub fn project_data(project_version: Version) -> MigrationData {
    MigrationData::new(ROOT, project_version, Version::new(0, 10, 1))
}

/// On-disk project with both legacy files in place
pub fn legacy_project_on_disk() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "config/defaults.js.ts", LEGACY_DEFAULTS);
    write_file(temp_dir.path(), "svelte.config.js", LEGACY_SVELTE_CONFIG);
    temp_dir
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn read_file(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}
