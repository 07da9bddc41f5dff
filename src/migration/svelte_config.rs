//! `svelte.config.js`: drop options removed from SvelteKit

use super::{Migration, MigrationContext, MigrationData, Outcome, migrate_lines};
use crate::error::Result;
use crate::patterns::{PatternKey, PatternRegistry};
use crate::rules::Rule;
use crate::version::Version;

/// Blanks the `trailingSlash` and `prerender.enabled` lines of the SvelteKit config
#[derive(Debug)]
pub struct SvelteConfigMigration {
    data: MigrationData,
}

impl SvelteConfigMigration {
    pub const ID: &'static str = "svelte-config";
    pub const INTRODUCED_IN: Version = Version::new(0, 10, 0);
    const TRIGGERS: [PatternKey; 2] = [PatternKey::TrailingSlash, PatternKey::PrerenderEnabled];

    pub fn make(data: MigrationData) -> Box<dyn Migration> {
        Box::new(Self { data })
    }

    fn rules(patterns: &PatternRegistry) -> Vec<Rule> {
        vec![
            Rule::remove_line(patterns.get(PatternKey::TrailingSlash)),
            Rule::remove_line(patterns.get(PatternKey::PrerenderEnabled)),
        ]
    }
}

impl Migration for SvelteConfigMigration {
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
