//! Version parsing for registry responses

use anyhow::Result;
use semver::Version;

/// Parse a published version string, tolerating a leading 'v'
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}

/// Caret range accepting compatible updates of `version`
pub fn caret_range(version: &str) -> String {
    format!("^{}", version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        assert_eq!(parse_version("1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_prefixed_version() {
        assert_eq!(parse_version("v4.0.0").unwrap(), Version::new(4, 0, 0));
    }

    #[test]
    fn test_parse_prerelease_keeps_tag() {
        assert!(parse_version("19.0.0-rc.1").is_ok());
        assert_eq!(caret_range("19.0.0-rc.1"), "^19.0.0-rc.1");
    }

    #[test]
    fn test_invalid_versions() {
        assert!(parse_version("latest").is_err());
        assert!(parse_version("").is_err());
        assert!(parse_version("1.2").is_err());
    }
}
