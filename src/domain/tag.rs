use crate::domain::version::SemanticVersion;
use crate::error::{Result, VersionError};
use regex::Regex;

const PLACEHOLDER: &str = "{version}";

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    /// Extract version number from tag (e.g., "v1.2.3" -> "1.2.3")
    pub fn version_part(&self) -> &str {
        self.name
            .strip_prefix('v')
            .or_else(|| self.name.strip_prefix('V'))
            .unwrap_or(&self.name)
    }
}

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub pattern: String,
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern::new(PLACEHOLDER)
    }
}

impl TagPattern {
    /// Create a new tag pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        TagPattern {
            pattern: pattern.into(),
        }
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version="1.2.3" -> "v1.2.3"
    pub fn format(&self, version: &str) -> String {
        self.pattern.replace(PLACEHOLDER, version)
    }

    /// Tag name for `version` in its release dialect
    pub fn tag_for(&self, version: &SemanticVersion) -> String {
        self.format(&version.release_string())
    }

    fn regex(&self) -> Result<Regex> {
        if !self.pattern.contains(PLACEHOLDER) {
            return Err(VersionError::config(format!(
                "Tag pattern '{}' must contain {} placeholder",
                self.pattern, PLACEHOLDER
            )));
        }

        let escaped = regex::escape(&self.pattern);
        let regex_pattern = escaped.replacen(r"\{version\}", r"(?P<version>.+)", 1);
        Ok(Regex::new(&format!("^{}$", regex_pattern))?)
    }

    /// Validate if a tag matches this pattern
    pub fn matches(&self, tag: &str) -> Result<bool> {
        Ok(self.regex()?.is_match(tag))
    }

    /// The text standing in for `{version}` in `tag`, if the tag follows
    /// this pattern at all.
    pub fn extract(&self, tag: &str) -> Result<Option<String>> {
        let re = self.regex()?;
        Ok(re
            .captures(tag)
            .and_then(|c| c.name("version"))
            .map(|m| m.as_str().to_string()))
    }

    /// Parse the version carried by `tag`.
    ///
    /// Returns `Ok(None)` for tags outside the pattern; tags inside the
    /// pattern whose version text does not parse are an error.
    pub fn version_of(&self, tag: &str) -> Result<Option<SemanticVersion>> {
        match self.extract(tag)? {
            Some(text) => {
                let version = SemanticVersion::parse(Tag::new(text).version_part())?;
                Ok(Some(version))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("v1.2.3");
        assert_eq!(tag.name, "v1.2.3");
    }

    #[test]
    fn test_tag_version_part() {
        assert_eq!(Tag::new("v1.2.3").version_part(), "1.2.3");
        assert_eq!(Tag::new("V2.0").version_part(), "2.0");
        assert_eq!(Tag::new("1.2.3").version_part(), "1.2.3");
    }

    #[test]
    fn test_pattern_format() {
        let pattern = TagPattern::new("v{version}");
        assert_eq!(pattern.format("1.2.3"), "v1.2.3");
    }

    #[test]
    fn test_pattern_format_with_suffix() {
        let pattern = TagPattern::new("release-{version}");
        assert_eq!(pattern.format("1.2.3"), "release-1.2.3");
    }

    #[test]
    fn test_tag_for_prerelease() {
        let pattern = TagPattern::new("v{version}");
        let version = SemanticVersion::parse("1.2.4.0rc1").unwrap();
        assert_eq!(pattern.tag_for(&version), "v1.2.4.0rc1");
    }

    #[test]
    fn test_pattern_matches() {
        let pattern = TagPattern::new("v{version}");
        assert!(pattern.matches("v1.2.3").unwrap());
        assert!(!pattern.matches("release-1.2.3").unwrap());
    }

    #[test]
    fn test_pattern_without_placeholder() {
        let pattern = TagPattern::new("latest");
        assert!(matches!(pattern.matches("latest"), Err(VersionError::Config(_))));
    }

    #[test]
    fn test_pattern_extract() {
        let pattern = TagPattern::new("release-{version}");
        assert_eq!(
            pattern.extract("release-1.2.3").unwrap(),
            Some("1.2.3".to_string())
        );
        assert_eq!(pattern.extract("v1.2.3").unwrap(), None);
    }

    #[test]
    fn test_default_pattern_accepts_v_prefix() {
        let pattern = TagPattern::default();
        assert_eq!(
            pattern.version_of("v1.2").unwrap(),
            Some(SemanticVersion::new(1, 2, 0))
        );
    }

    #[test]
    fn test_version_of_unparsable() {
        let pattern = TagPattern::default();
        assert!(matches!(
            pattern.version_of("nightly"),
            Err(VersionError::MalformedVersion { .. })
        ));
    }
}
