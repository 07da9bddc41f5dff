//! Line-level rewrite rules
//!
//! A [`Rule`] pairs a pattern with a [`Replacement`]. When a migration fires,
//! its file is split into lines and every line is offered to the migration's
//! rules in order. The first rule that matches wins and produces the new line;
//! lines no rule matches pass through untouched. The engine knows nothing about
//! the files it edits.
//!
//! Line endings are preserved: a CRLF file stays CRLF, including any
//! multi-line text a rule inserts, and a missing trailing newline stays
//! missing.

use crate::patterns::{Matcher, Pattern};
use regex::Captures;
use std::fmt;
use std::sync::Arc;

/// Function producing replacement text from the matched text
pub type ReplacerFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// What a matching rule produces
#[derive(Clone)]
pub enum Replacement {
    /// Empty string; as a full-line rule this blanks the line
    Remove,
    /// Constant text, may span several lines
    Text(String),
    /// Regex replacement template (`$1`, `$name`); behaves like `Text` for literal patterns
    Expand(String),
    /// Arbitrary function of the matched text
    With(ReplacerFn),
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Remove => f.write_str("Remove"),
            Replacement::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Replacement::Expand(template) => f.debug_tuple("Expand").field(template).finish(),
            Replacement::With(_) => f.write_str("With(<fn>)"),
        }
    }
}

/// A single line transformation
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Pattern,
    replace_full_line: bool,
    replacement: Replacement,
}

impl Rule {
    /// Create a rule
    ///
    /// # Arguments
    ///
    /// * `pattern` - Pattern matched against one line
    /// * `replace_full_line` - Replace the whole line instead of only the matched span
    /// * `replacement` - Text produced for a match
    pub fn new(pattern: &Pattern, replace_full_line: bool, replacement: Replacement) -> Self {
        Self {
            pattern: pattern.clone(),
            replace_full_line,
            replacement,
        }
    }

    /// Full-line rule replacing a matching line with `text`
    pub fn replace_line(pattern: &Pattern, text: impl Into<String>) -> Self {
        Self::new(pattern, true, Replacement::Text(text.into()))
    }

    /// Full-line rule blanking a matching line
    pub fn remove_line(pattern: &Pattern) -> Self {
        Self::new(pattern, true, Replacement::Remove)
    }

    /// In-place rule substituting only the matched span
    pub fn splice(pattern: &Pattern, replacement: Replacement) -> Self {
        Self::new(pattern, false, replacement)
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn replaces_full_line(&self) -> bool {
        self.replace_full_line
    }

    /// Apply the rule to one line (without its line terminator)
    ///
    /// # Returns
    ///
    /// The rewritten line, or `None` if the pattern does not match
    pub fn apply(&self, line: &str) -> Option<String> {
        let (range, produced) = match self.pattern.matcher() {
            Matcher::Regex(re) => {
                let caps = re.captures(line)?;
                let whole = caps.get(0)?;
                (whole.range(), self.produce(whole.as_str(), Some(&caps)))
            }
            Matcher::Literal(_) => {
                let range = self.pattern.find(line)?;
                let produced = self.produce(&line[range.clone()], None);
                (range, produced)
            }
        };

        if self.replace_full_line {
            Some(produced)
        } else {
            Some(format!(
                "{}{}{}",
                &line[..range.start],
                produced,
                &line[range.end..]
            ))
        }
    }

    fn produce(&self, matched: &str, caps: Option<&Captures<'_>>) -> String {
        match &self.replacement {
            Replacement::Remove => String::new(),
            Replacement::Text(text) => text.clone(),
            Replacement::Expand(template) => match caps {
                Some(caps) => {
                    let mut expanded = String::new();
                    caps.expand(template, &mut expanded);
                    expanded
                }
                None => template.clone(),
            },
            Replacement::With(replacer) => replacer(matched),
        }
    }
}

/// Apply `rules` to a single line, first match wins
///
/// # Returns
///
/// The output of the first matching rule, or `None` if no rule matches
pub fn apply_rules(line: &str, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(line))
}

/// Line terminator style of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the style from the first line terminator; files without one are LF
    pub fn detect(content: &str) -> Self {
        match content.find('\n') {
            Some(idx) if content[..idx].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Convert every line break in `s` to `ending`
pub fn normalize_line_endings(s: &str, ending: LineEnding) -> String {
    let lf = s.replace("\r\n", "\n");
    match ending {
        LineEnding::Lf => lf,
        LineEnding::CrLf => lf.replace('\n', "\r\n"),
    }
}

/// Rewrite `content` line by line with `rules`
///
/// Lines no rule matches are copied byte for byte. Empty content is returned
/// unchanged.
pub fn rewrite_lines(content: &str, rules: &[Rule]) -> String {
    let ending = LineEnding::detect(content);
    content
        .split('\n')
        .map(|raw| {
            let (line, cr) = match raw.strip_suffix('\r') {
                Some(line) => (line, "\r"),
                None => (raw, ""),
            };
            match apply_rules(line, rules) {
                Some(rewritten) => format!("{}{}", normalize_line_endings(&rewritten, ending), cr),
                None => raw.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternKey;

    fn regex_pattern(source: &str) -> Pattern {
        Pattern::new(
            PatternKey::TrailingSlash,
            Matcher::regex(PatternKey::TrailingSlash, source).unwrap(),
        )
    }

    #[test]
    fn test_full_line_replacement() {
        let rule = Rule::replace_line(&regex_pattern("old"), "brand new");
        assert_eq!(rule.apply("  the old line"), Some("brand new".to_string()));
        assert_eq!(rule.apply("untouched"), None);
    }

    #[test]
    fn test_splice_replacement() {
        let rule = Rule::splice(&regex_pattern("old"), Replacement::Text("new".into()));
        assert_eq!(rule.apply("  the old line"), Some("  the new line".to_string()));
        assert!(!rule.replaces_full_line());
    }

    #[test]
    fn test_remove_line() {
        let rule = Rule::remove_line(&regex_pattern(r"^\s*trailingSlash"));
        assert_eq!(rule.apply("\ttrailingSlash: 'always',"), Some(String::new()));
    }

    #[test]
    fn test_splice_remove_drops_only_match() {
        let pattern = Pattern::new(PatternKey::PrerenderEnabled, Matcher::literal(" // legacy"));
        let rule = Rule::splice(&pattern, Replacement::Remove);
        assert_eq!(rule.apply("crawl: true, // legacy"), Some("crawl: true,".to_string()));
    }

    #[test]
    fn test_expand_uses_captures() {
        let rule = Rule::splice(
            &regex_pattern(r"adapter-(?P<kind>\w+)"),
            Replacement::Expand("adapter-$kind-v2".into()),
        );
        assert_eq!(
            rule.apply("import adapter from '@sveltejs/adapter-static';"),
            Some("import adapter from '@sveltejs/adapter-static-v2';".to_string())
        );
    }

    #[test]
    fn test_with_function_receives_matched_text() {
        let rule = Rule::splice(
            &regex_pattern(r"'[a-z]+'"),
            Replacement::With(Arc::new(|m: &str| m.to_uppercase())),
        );
        assert_eq!(rule.apply("mode: 'static',"), Some("mode: 'STATIC',".to_string()));
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            Rule::replace_line(&regex_pattern("alpha"), "first"),
            Rule::replace_line(&regex_pattern("alpha beta"), "second"),
        ];
        assert_eq!(apply_rules("alpha beta", &rules), Some("first".to_string()));
        assert_eq!(apply_rules("gamma", &rules), None);
    }

    #[test]
    fn test_rewrite_empty_content() {
        let rules = vec![Rule::remove_line(&regex_pattern(".*"))];
        assert_eq!(rewrite_lines("", &[]), "");
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
        // 空行にもマッチするルールでも空文字列は空文字列のまま
        assert_eq!(rewrite_lines("", &rules), "");
    }

    #[test]
    fn test_rewrite_preserves_crlf() {
        let content = "a\r\nold\r\nc";
        let rules = vec![Rule::replace_line(&regex_pattern("^old$"), "x\ny")];
        assert_eq!(rewrite_lines(content, &rules), "a\r\nx\r\ny\r\nc");
    }

    #[test]
    fn test_rewrite_keeps_trailing_newline() {
        let rules = vec![Rule::replace_line(&regex_pattern("^b$"), "B")];
        assert_eq!(rewrite_lines("a\nb\n", &rules), "a\nB\n");
        assert_eq!(rewrite_lines("a\nb", &rules), "a\nB");
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\nc", LineEnding::Lf), "a\nb\nc");
        assert_eq!(normalize_line_endings("a\r\nb\nc", LineEnding::CrLf), "a\r\nb\r\nc");
    }
}
