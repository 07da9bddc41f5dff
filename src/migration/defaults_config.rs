//! `config/defaults.js.ts`: read the Sveltin version from `sveltin.json`
//!
//! Projects generated before 0.9.0 hard-code the tool version in the defaults
//! file. The constant line is replaced by an import of `sveltin.json`.

use super::{Migration, MigrationContext, MigrationData, Outcome, migrate_lines};
use crate::error::Result;
use crate::patterns::{PatternKey, PatternRegistry};
use crate::rules::{Replacement, Rule};
use crate::version::Version;
use std::sync::Arc;

/// Replacement for the hard-coded `const sveltinVersion = '<version>';` line
pub const VERSION_IMPORT_BLOCK: &str = "import { sveltin } from '../sveltin.json';

const sveltinVersion = sveltin.version;";

/// Import block for one matched constant line, keeping an `export` in front of the constant
fn import_block(matched: &str) -> String {
    match matched.trim_start().strip_prefix("export") {
        Some(rest) if rest.starts_with(char::is_whitespace) => {
            VERSION_IMPORT_BLOCK.replacen("const sveltinVersion", "export const sveltinVersion", 1)
        }
        _ => VERSION_IMPORT_BLOCK.to_string(),
    }
}

/// Replaces the hard-coded version constant of the defaults file
#[derive(Debug)]
pub struct DefaultsConfigMigration {
    data: MigrationData,
}

impl DefaultsConfigMigration {
    pub const ID: &'static str = "defaults-config";
    pub const INTRODUCED_IN: Version = Version::new(0, 9, 0);
    const TRIGGERS: [PatternKey; 1] = [PatternKey::SemVersion];

    pub fn make(data: MigrationData) -> Box<dyn Migration> {
        Box::new(Self { data })
    }

    fn rules(patterns: &PatternRegistry) -> Vec<Rule> {
        vec![Rule::new(
            patterns.get(PatternKey::SemVersion),
            true,
            Replacement::With(Arc::new(import_block)),
        )]
    }
}

impl Migration for DefaultsConfigMigration {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn introduced_in(&self) -> Version {
        Self::INTRODUCED_IN
    }

    fn data(&self) -> &MigrationData {
        &self.data
    }

    fn up(&self, ctx: &MigrationContext<'_>) -> Result<Outcome> {
        migrate_lines(self, ctx, &Self::TRIGGERS, Self::rules)
    }
}
