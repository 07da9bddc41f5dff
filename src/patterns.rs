//! Pattern registry
//!
//! Each migration decides whether a file is outdated by looking for one or
//! more trigger patterns. Patterns are looked up by a symbolic key in a
//! [`PatternRegistry`], which is built explicitly and handed to the engine
//! through [`crate::MigrationServices`] so it can be overridden from the
//! settings file or replaced in tests.

use crate::error::{MigrationError, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Hard-coded version constant written by releases before `sveltin.json` existed,
/// e.g. `const sveltinVersion = '0.8.1';`
const SEM_VERSION: &str = r#"(?m)^\s*(?:export\s+)?const\s+sveltinVersion\s*=\s*['"]v?(?P<version>\d+\.\d+\.\d+)['"]\s*;?\s*$"#;

/// `kit.trailingSlash` directive, no longer accepted in `svelte.config.js`
const TRAILING_SLASH: &str = r#"(?m)^\s*trailingSlash\s*:\s*['"][a-z]+['"]\s*,?\s*$"#;

/// `kit.prerender.enabled` directive, no longer accepted in `svelte.config.js`
const PRERENDER_ENABLED: &str = r"(?m)^\s*enabled\s*:\s*(?:true|false)\s*,?\s*$";

/// Symbolic name of a trigger pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKey {
    SemVersion,
    TrailingSlash,
    PrerenderEnabled,
}

impl PatternKey {
    pub const ALL: [PatternKey; 3] = [
        PatternKey::SemVersion,
        PatternKey::TrailingSlash,
        PatternKey::PrerenderEnabled,
    ];

    /// Name used in settings files
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKey::SemVersion => "sem_version",
            PatternKey::TrailingSlash => "trailing_slash",
            PatternKey::PrerenderEnabled => "prerender_enabled",
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKey {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        PatternKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| MigrationError::UnknownPattern(s.to_string()))
    }
}

/// How a pattern recognises text
#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex),
    Literal(String),
}

impl Matcher {
    /// Compile a regular expression matcher for `key`
    pub fn regex(key: PatternKey, source: &str) -> Result<Self> {
        Regex::new(source)
            .map(Matcher::Regex)
            .map_err(|source| MigrationError::Pattern {
                key: key.to_string(),
                source,
            })
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Matcher::Literal(text.into())
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Regex(re) => re.is_match(text),
            Matcher::Literal(literal) => text.contains(literal.as_str()),
        }
    }

    /// Byte range of the leftmost match in `text`
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        match self {
            Matcher::Regex(re) => re.find(text).map(|m| m.range()),
            Matcher::Literal(literal) => text
                .find(literal.as_str())
                .map(|start| start..start + literal.len()),
        }
    }
}

/// A trigger pattern together with its symbolic key
#[derive(Debug, Clone)]
pub struct Pattern {
    key: PatternKey,
    matcher: Matcher,
}

impl Pattern {
    pub fn new(key: PatternKey, matcher: Matcher) -> Self {
        Self { key, matcher }
    }

    pub fn key(&self) -> PatternKey {
        self.key
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        self.matcher.find(text)
    }

    /// Value of a named capture group; always `None` for literal matchers
    pub fn capture<'t>(&self, text: &'t str, name: &str) -> Option<&'t str> {
        match &self.matcher {
            Matcher::Regex(re) => re
                .captures(text)
                .and_then(|caps| caps.name(name))
                .map(|m| m.as_str()),
            Matcher::Literal(_) => None,
        }
    }
}

/// Pattern definition as written in the settings file
///
/// ```toml
/// [patterns]
/// trailing_slash = { regex = "^\\s*trailingSlash:.*$" }
/// prerender_enabled = { literal = "enabled: true," }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    Regex(String),
    Literal(String),
}

/// The full set of trigger patterns used by one run
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    sem_version: Pattern,
    trailing_slash: Pattern,
    prerender_enabled: Pattern,
}

impl PatternRegistry {
    /// Registry with the builtin patterns
    pub fn builtin() -> Result<Self> {
        let compile = |key, source| Matcher::regex(key, source).map(|m| Pattern::new(key, m));
        Ok(Self {
            sem_version: compile(PatternKey::SemVersion, SEM_VERSION)?,
            trailing_slash: compile(PatternKey::TrailingSlash, TRAILING_SLASH)?,
            prerender_enabled: compile(PatternKey::PrerenderEnabled, PRERENDER_ENABLED)?,
        })
    }

    /// Builtin registry with the given overrides applied
    ///
    /// # Arguments
    ///
    /// * `overrides` - Map from pattern name (e.g. `trailing_slash`) to its new definition
    ///
    /// # Returns
    ///
    /// Result containing the registry, or an error for unknown names and invalid regexes
    pub fn with_overrides(overrides: &BTreeMap<String, PatternSource>) -> Result<Self> {
        let mut registry = Self::builtin()?;
        for (name, source) in overrides {
            let key: PatternKey = name.parse()?;
            let matcher = match source {
                PatternSource::Regex(re) => Matcher::regex(key, re)?,
                PatternSource::Literal(text) => Matcher::literal(text.as_str()),
            };
            registry.set(key, matcher);
        }
        Ok(registry)
    }

    /// Replace the matcher registered for `key`
    pub fn set(&mut self, key: PatternKey, matcher: Matcher) {
        *self.slot_mut(key) = Pattern::new(key, matcher);
    }

    pub fn get(&self, key: PatternKey) -> &Pattern {
        match key {
            PatternKey::SemVersion => &self.sem_version,
            PatternKey::TrailingSlash => &self.trailing_slash,
            PatternKey::PrerenderEnabled => &self.prerender_enabled,
        }
    }

    fn slot_mut(&mut self, key: PatternKey) -> &mut Pattern {
        match key {
            PatternKey::SemVersion => &mut self.sem_version,
            PatternKey::TrailingSlash => &mut self.trailing_slash,
            PatternKey::PrerenderEnabled => &mut self.prerender_enabled,
        }
    }

    /// Returns true if any of `triggers` matches somewhere in `content`
    pub fn any_match(&self, triggers: &[PatternKey], content: &str) -> bool {
        triggers.iter().any(|key| self.get(*key).is_match(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sem_version_pattern() {
        let registry = PatternRegistry::builtin().unwrap();
        let pattern = registry.get(PatternKey::SemVersion);

        assert!(pattern.is_match("const sveltinVersion = '0.8.1';"));
        assert!(pattern.is_match("export const sveltinVersion = \"v0.9.0\""));
        assert!(!pattern.is_match("const sveltinVersion = sveltin.version;"));
        assert_eq!(
            pattern.capture("const sveltinVersion = '0.8.1';", "version"),
            Some("0.8.1")
        );
    }

    #[test]
    fn test_sem_version_matches_inside_content() {
        let registry = PatternRegistry::builtin().unwrap();
        let content = "const name = 'site';\r\nconst sveltinVersion = '0.8.1';\r\nexport { name };\r\n";
        assert!(registry.any_match(&[PatternKey::SemVersion], content));
    }

    #[test]
    fn test_svelte_config_patterns() {
        let registry = PatternRegistry::builtin().unwrap();

        assert!(registry.get(PatternKey::TrailingSlash).is_match("\t\ttrailingSlash: 'always',"));
        assert!(registry.get(PatternKey::TrailingSlash).is_match("  trailingSlash: \"never\""));
        assert!(!registry.get(PatternKey::TrailingSlash).is_match("// no trailingSlash here"));

        assert!(registry.get(PatternKey::PrerenderEnabled).is_match("\t\t\tenabled: true,"));
        assert!(!registry.get(PatternKey::PrerenderEnabled).is_match("\t\t\tdefault: true,"));
    }

    #[test]
    fn test_literal_matcher_find() {
        let matcher = Matcher::literal("enabled");
        assert_eq!(matcher.find("  enabled: true"), Some(2..9));
        assert_eq!(matcher.find("disabled"), None);
        assert!(!matcher.is_match("Enabled"));
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "prerender_enabled".to_string(),
            PatternSource::Literal("crawl: true".to_string()),
        );
        let registry = PatternRegistry::with_overrides(&overrides).unwrap();

        let pattern = registry.get(PatternKey::PrerenderEnabled);
        assert_eq!(pattern.key(), PatternKey::PrerenderEnabled);
        assert!(pattern.is_match("    crawl: true,"));
        assert!(!pattern.is_match("    enabled: true,"));
        // 上書きされていないパターンはそのまま
        assert!(registry.get(PatternKey::TrailingSlash).is_match("trailingSlash: 'always',"));
    }

    #[test]
    fn test_unknown_override_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("base_path".to_string(), PatternSource::Literal("x".to_string()));
        let err = PatternRegistry::with_overrides(&overrides).unwrap_err();
        assert!(matches!(err, MigrationError::UnknownPattern(name) if name == "base_path"));
    }

    #[test]
    fn test_invalid_override_regex_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("trailing_slash".to_string(), PatternSource::Regex("(".to_string()));
        let err = PatternRegistry::with_overrides(&overrides).unwrap_err();
        assert!(err.to_string().contains("trailing_slash"));
    }

    #[test]
    fn test_pattern_key_round_trip_names() {
        for key in PatternKey::ALL {
            assert_eq!(key.as_str().parse::<PatternKey>().unwrap(), key);
        }
    }
}
