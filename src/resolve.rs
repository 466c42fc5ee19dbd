//! Resolving "the current version" and "the next version" of a project.
//!
//! This is the only place where configuration, package metadata and
//! version control meet the version model. Everything a lookup needs is
//! resolved here once and handed to the domain functions as plain values.

use crate::config::Config;
use crate::domain::{ReleaseGranularity, RenderStyle, SemanticVersion, TagPattern};
use crate::error::{Result, VersionError};
use crate::history::{version_from_history, HistorySource, TagTarget, VersionAnalyzer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const METADATA_FILES: [&str; 2] = ["PKG-INFO", "METADATA"];

/// Result of [Resolver::tag_next_release]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Created(String),
    AlreadyExists(String),
    /// Dry run: the tag that would have been created
    Planned(String),
}

/// Where a project's installed metadata lives
#[derive(Debug, Clone)]
struct PackageMetadata {
    name: String,
    dir: PathBuf,
}

/// Resolves versions at the boundary between configuration, version control
/// and the version model
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: Config,
    package: Option<PackageMetadata>,
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Resolver {
            config,
            package: None,
        }
    }

    /// Also consult `PKG-INFO`/`METADATA` in `dir` for package `name`
    pub fn with_package(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.package = Some(PackageMetadata {
            name: name.into(),
            dir: dir.into(),
        });
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tag_pattern(&self) -> TagPattern {
        TagPattern::new(self.config.tags.pattern.clone())
    }

    pub fn analyzer(&self) -> VersionAnalyzer {
        VersionAnalyzer::new(self.config.sem_ver.clone())
    }

    /// Granularity for [Resolver::next_version]
    pub fn release_type(&self) -> ReleaseGranularity {
        self.config.release.release_type.unwrap_or_default()
    }

    /// The current version, or `None` when nothing knows it.
    ///
    /// Lookup order: the `release_version` override, package metadata,
    /// version control. An unreachable repository means "unknown"; a
    /// history that yields an invalid version is an error.
    pub fn current_version<S: HistorySource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Option<SemanticVersion>> {
        if let Some(version) = &self.config.release.release_version {
            info!(version = %version, "using release version override");
            return SemanticVersion::parse(version).map(Some);
        }

        if let Some(package) = &self.package {
            if let Some(version) = package_metadata_version(&package.dir, &package.name)? {
                info!(version = %version, package = %package.name, "using package metadata");
                return SemanticVersion::parse(&version).map(Some);
            }
        }

        match version_from_history(
            source,
            self.config.release.pre_version.as_deref(),
            &self.analyzer(),
            &self.tag_pattern(),
        ) {
            Ok(version) => Ok(Some(version)),
            Err(err) if err.is_collaborator_failure() => {
                warn!(error = %err, "version control unavailable, version unknown");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Like [Resolver::current_version], falling back to the configured
    /// default version.
    pub fn current_or_default<S: HistorySource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<SemanticVersion> {
        if let Some(version) = self.current_version(source)? {
            return Ok(version);
        }

        let default = &self.config.release.default_version;
        warn!(
            "Versioning for this project requires an sdist, tarball, or access to an upstream git repository. Defaulting the version to {}",
            default
        );
        SemanticVersion::parse(default)
    }

    pub fn next_version(&self, current: &SemanticVersion) -> Result<SemanticVersion> {
        current.increment(self.release_type())
    }

    /// Brief form when a release type is configured, release form otherwise
    pub fn display_string(&self, version: &SemanticVersion) -> String {
        let style = if self.config.release.release_type.is_some() {
            RenderStyle::Brief
        } else {
            RenderStyle::Release
        };
        version.render(style)
    }

    pub fn next_tag(&self, current: &SemanticVersion) -> Result<String> {
        Ok(self.tag_pattern().tag_for(&self.next_version(current)?))
    }

    /// Tag HEAD with the next release.
    ///
    /// An existing tag of the same name is left alone.
    pub fn tag_next_release<S>(&self, source: &S, dry_run: bool) -> Result<TagOutcome>
    where
        S: HistorySource + TagTarget + ?Sized,
    {
        let current = self.current_or_default(source)?;
        let tag = self.next_tag(&current)?;

        if source.tag_exists(&tag)? {
            info!(tag = %tag, "tag already exists, skipping");
            return Ok(TagOutcome::AlreadyExists(tag));
        }
        if dry_run {
            return Ok(TagOutcome::Planned(tag));
        }

        info!(tag = %tag, "adding tag");
        source.create_tag(&tag)?;
        Ok(TagOutcome::Created(tag))
    }
}

/// `Version` of package `name` from `PKG-INFO` or `METADATA` in `dir`.
///
/// Files for another package are ignored.
pub fn package_metadata_version(dir: &Path, name: &str) -> Result<Option<String>> {
    for file in METADATA_FILES {
        let text = match fs::read_to_string(dir.join(file)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(VersionError::Io(e)),
        };

        let headers = parse_headers(&text);
        let header = |key: &str| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        };

        if header("Name") == Some(name) {
            return Ok(header("Version").map(str::to_string));
        }
    }

    Ok(None)
}

/// `Key: value` lines up to the first blank line
fn parse_headers(text: &str) -> Vec<(String, String)> {
    text.lines()
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MockHistory;
    use tempfile::TempDir;

    fn tagged_history() -> MockHistory {
        let mut history = MockHistory::new();
        history.add_commit("c1", "initial");
        history.add_tag("1.2.3");
        history
    }

    #[test]
    fn test_override_wins() {
        let mut config = Config::default();
        config.release.release_version = Some("2.0.0".to_string());
        let resolver = Resolver::new(config);

        let version = resolver.current_version(&tagged_history()).unwrap();
        assert_eq!(version, Some(SemanticVersion::new(2, 0, 0)));
    }

    #[test]
    fn test_bad_override_is_error() {
        let mut config = Config::default();
        config.release.release_version = Some("6eed5ae".to_string());
        let resolver = Resolver::new(config);

        assert!(matches!(
            resolver.current_version(&tagged_history()),
            Err(VersionError::MalformedVersion { .. })
        ));
    }

    #[test]
    fn test_history_version() {
        let resolver = Resolver::default();
        let version = resolver.current_version(&tagged_history()).unwrap();
        assert_eq!(version, Some(SemanticVersion::new(1, 2, 3)));
    }

    #[test]
    fn test_unavailable_history_is_unknown() {
        let resolver = Resolver::default();
        assert_eq!(
            resolver.current_version(&MockHistory::unavailable()).unwrap(),
            None
        );
        assert_eq!(
            resolver.current_or_default(&MockHistory::unavailable()).unwrap(),
            SemanticVersion::new(0, 0, 1)
        );
    }

    #[test]
    fn test_next_version_uses_release_type() {
        let mut config = Config::default();
        config.release.release_type = Some(ReleaseGranularity::Minor);
        let resolver = Resolver::new(config);

        let next = resolver.next_version(&SemanticVersion::new(1, 2, 5)).unwrap();
        assert_eq!(next, SemanticVersion::new(1, 3, 0));
        assert_eq!(Resolver::default().next_version(&SemanticVersion::new(1, 2, 5)).unwrap(),
            SemanticVersion::new(1, 2, 6));
    }

    #[test]
    fn test_display_string() {
        let version = SemanticVersion::development(1, 2, 4, 5, Some("12"));
        assert_eq!(Resolver::default().display_string(&version), "1.2.4.dev5.g12");

        let mut config = Config::default();
        config.release.release_type = Some(ReleaseGranularity::Patch);
        assert_eq!(Resolver::new(config).display_string(&version), "1.2.4");
    }

    #[test]
    fn test_package_metadata() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("PKG-INFO"),
            "Metadata-Version: 2.1\nName: widget\nVersion: 3.1.4\n\nVersion: 9.9.9\n",
        )
        .unwrap();

        assert_eq!(
            package_metadata_version(dir.path(), "widget").unwrap(),
            Some("3.1.4".to_string())
        );
        assert_eq!(package_metadata_version(dir.path(), "gadget").unwrap(), None);

        let resolver = Resolver::default().with_package("widget", dir.path());
        assert_eq!(
            resolver.current_version(&MockHistory::unavailable()).unwrap(),
            Some(SemanticVersion::new(3, 1, 4))
        );
    }

    #[test]
    fn test_tag_next_release() {
        let history = tagged_history();
        let resolver = Resolver::default();

        assert_eq!(
            resolver.tag_next_release(&history, true).unwrap(),
            TagOutcome::Planned("1.2.4".to_string())
        );
        assert_eq!(
            resolver.tag_next_release(&history, false).unwrap(),
            TagOutcome::Created("1.2.4".to_string())
        );
        assert_eq!(
            resolver.tag_next_release(&history, false).unwrap(),
            TagOutcome::AlreadyExists("1.2.4".to_string())
        );
    }
}
