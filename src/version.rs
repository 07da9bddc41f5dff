//! Version handling for project and tool versions
//!
//! Versions are plain semantic versions. Project files written by older
//! releases are not always strict about the format, so parsing tolerates a
//! leading `v`, surrounding quotes and whitespace.

use crate::error::{MigrationError, Result};

pub use semver::Version;

/// Version of the running tool, used as the default target version
pub fn tool_version() -> Version {
    Version::new(
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
    )
}

/// Parse a version string leniently
///
/// # Arguments
///
/// * `value` - Version string such as `0.9.1`, `v0.9.1` or `'0.9.1'`
///
/// # Returns
///
/// Result containing the parsed version or `MigrationError::Version`
pub fn parse_version(value: &str) -> Result<Version> {
    let trimmed = value
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim_start_matches(['v', 'V']);
    Version::parse(trimmed).map_err(|source| MigrationError::Version {
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        assert_eq!(parse_version("0.9.1").unwrap(), Version::new(0, 9, 1));
    }

    #[test]
    fn test_parse_decorated_version() {
        assert_eq!(parse_version(" v0.10.0 ").unwrap(), Version::new(0, 10, 0));
        assert_eq!(parse_version("'0.8.3'").unwrap(), Version::new(0, 8, 3));
        assert_eq!(parse_version("\"V1.2.3\"").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_invalid_version() {
        let err = parse_version("latest").unwrap_err();
        assert!(err.to_string().contains("latest"));
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(0, 9, 9) < Version::new(0, 10, 0));
        assert!(Version::new(1, 0, 0) > Version::new(0, 99, 99));
        assert_eq!(Version::new(0, 9, 0), parse_version("v0.9.0").unwrap());
    }

    #[test]
    fn test_tool_version_matches_package() {
        assert_eq!(tool_version().to_string(), env!("CARGO_PKG_VERSION"));
    }
}
