use crate::domain::parser;
use crate::domain::prerelease::PrereleaseType;
use crate::error::{Result, VersionError};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Where a version sits relative to its nominal `major.minor.patch` release.
///
/// A version is a prerelease or a development snapshot, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A plain release
    Release,
    /// An alpha, beta or release candidate of the release
    Prerelease { kind: PrereleaseType, serial: u32 },
    /// An untagged snapshot `count` commits past the last release tag
    Development { count: u32, hash: Option<String> },
}

/// Semantic version with optional pre-release or development marker
///
/// Equality is field-wise. Ordering is partial: a prerelease and a
/// development snapshot of the same release have no defined order, nor do
/// two snapshots at the same distance built from different trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub stage: Stage,
}

/// The string dialects a version can be rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Release,
    Debian,
    Rpm,
    Brief,
}

impl FromStr for RenderStyle {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "release" => Ok(RenderStyle::Release),
            "debian" | "deb" => Ok(RenderStyle::Debian),
            "rpm" => Ok(RenderStyle::Rpm),
            "brief" => Ok(RenderStyle::Brief),
            other => Err(VersionError::config(format!(
                "Unknown render style: '{}'",
                other
            ))),
        }
    }
}

/// Release kind reported in a [`VersionTuple`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    Alpha,
    Beta,
    Candidate,
    Dev,
    Final,
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseKind::Alpha => "alpha",
            ReleaseKind::Beta => "beta",
            ReleaseKind::Candidate => "candidate",
            ReleaseKind::Dev => "dev",
            ReleaseKind::Final => "final",
        };
        f.write_str(name)
    }
}

/// `(major, minor, patch, kind, serial)` in the style of a `version_info` tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTuple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub kind: ReleaseKind,
    pub serial: u32,
}

impl SemanticVersion {
    /// Create a plain release version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            stage: Stage::Release,
        }
    }

    /// Create a prerelease version, e.g. `1.2.4.0b1`
    pub fn prerelease(
        major: u32,
        minor: u32,
        patch: u32,
        kind: PrereleaseType,
        serial: u32,
    ) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            stage: Stage::Prerelease { kind, serial },
        }
    }

    /// Create a development snapshot, e.g. `1.2.4.dev5.g12`
    pub fn development(
        major: u32,
        minor: u32,
        patch: u32,
        count: u32,
        hash: Option<impl Into<String>>,
    ) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            stage: Stage::Development {
                count,
                hash: hash.map(Into::into),
            },
        }
    }

    /// Build a version from loose optional fields.
    ///
    /// A missing prerelease serial defaults to 0. Supplying a prerelease
    /// together with a development count, or a source hash without a
    /// development count, is an `InvalidConstruction` error.
    pub fn from_parts(
        major: u32,
        minor: u32,
        patch: u32,
        prerelease: Option<(PrereleaseType, Option<u32>)>,
        dev_count: Option<u32>,
        hash: Option<String>,
    ) -> Result<Self> {
        let stage = match (prerelease, dev_count, hash) {
            (Some((kind, _)), Some(count), _) => {
                return Err(VersionError::InvalidConstruction(format!(
                    "cannot have prerelease and dev strings {} {}",
                    kind, count
                )))
            }
            (Some(_), None, Some(hash)) | (None, None, Some(hash)) => {
                return Err(VersionError::InvalidConstruction(format!(
                    "source hash '{}' requires a dev count",
                    hash
                )))
            }
            (Some((kind, serial)), None, None) => Stage::Prerelease {
                kind,
                serial: serial.unwrap_or(0),
            },
            (None, Some(count), hash) => Stage::Development { count, hash },
            (None, None, None) => Stage::Release,
        };

        Ok(SemanticVersion {
            major,
            minor,
            patch,
            stage,
        })
    }

    /// Parse a version string in any of the accepted dialects
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse(text)
    }

    pub fn prerelease_type(&self) -> Option<PrereleaseType> {
        match self.stage {
            Stage::Prerelease { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn prerelease_serial(&self) -> Option<u32> {
        match self.stage {
            Stage::Prerelease { serial, .. } => Some(serial),
            _ => None,
        }
    }

    pub fn dev_count(&self) -> Option<u32> {
        match self.stage {
            Stage::Development { count, .. } => Some(count),
            _ => None,
        }
    }

    pub fn source_hash(&self) -> Option<&str> {
        match &self.stage {
            Stage::Development { hash, .. } => hash.as_deref(),
            _ => None,
        }
    }

    /// True when the version carries neither a prerelease nor a dev marker
    pub fn is_release(&self) -> bool {
        self.stage == Stage::Release
    }

    /// `major.minor.patch` without any markers
    pub fn brief_string(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// The canonical form, e.g. `1.2.4.0rc1` or `1.2.4.dev5.g12`
    pub fn release_string(&self) -> String {
        self.long_version(Some("."), ".g", "0")
    }

    /// The form sorting correctly under dpkg, e.g. `1.2.4~rc1`
    pub fn debian_string(&self) -> String {
        self.long_version(Some("~"), "+g", "")
    }

    /// The form sorting correctly under rpm, which has no sort-before
    /// operator: non-final versions are shown as versions of the release
    /// before, e.g. `1.2.3.rc1` for `1.2.4.0rc1`.
    pub fn rpm_string(&self) -> String {
        self.long_version(None, "+g", "")
    }

    /// Render in the requested dialect
    pub fn render(&self, style: RenderStyle) -> String {
        match style {
            RenderStyle::Release => self.release_string(),
            RenderStyle::Debian => self.debian_string(),
            RenderStyle::Rpm => self.rpm_string(),
            RenderStyle::Brief => self.brief_string(),
        }
    }

    // `pre_separator` of None means "no sort-before operator": the base is
    // decremented and `.` separates the markers.
    fn long_version(
        &self,
        pre_separator: Option<&str>,
        hash_separator: &str,
        rc_marker: &str,
    ) -> String {
        let (mut out, pre_separator) = match pre_separator {
            Some(separator) => (self.brief_string(), separator),
            None if self.is_release() => (self.brief_string(), "."),
            None => (self.decrement().brief_string(), "."),
        };

        match &self.stage {
            Stage::Release => {}
            Stage::Prerelease { kind, serial } => {
                out.push_str(&format!("{}{}{}{}", pre_separator, rc_marker, kind, serial));
            }
            Stage::Development { count, hash } => {
                out.push_str(&format!("{}dev{}", pre_separator, count));
                if let Some(hash) = hash {
                    out.push_str(hash_separator);
                    out.push_str(hash);
                }
            }
        }
        out
    }

    /// Present the version as a `version_info` style tuple.
    ///
    /// Dev serials are zero-based: a dev count of 5 reports serial 4.
    pub fn version_tuple(&self) -> VersionTuple {
        let (kind, serial) = match &self.stage {
            Stage::Prerelease { kind, serial } => {
                let kind = match kind {
                    PrereleaseType::Alpha => ReleaseKind::Alpha,
                    PrereleaseType::Beta => ReleaseKind::Beta,
                    PrereleaseType::Candidate => ReleaseKind::Candidate,
                };
                (kind, *serial)
            }
            Stage::Development { count, .. } => (ReleaseKind::Dev, count.saturating_sub(1)),
            Stage::Release => (ReleaseKind::Final, 0),
        };

        VersionTuple {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            kind,
            serial,
        }
    }

    /// Total comparison, failing with `IncomparableVersions` where the order
    /// is undefined.
    pub fn compare(&self, other: &Self) -> Result<Ordering> {
        self.partial_cmp(other)
            .ok_or_else(|| VersionError::incomparable(self, other))
    }

    pub fn try_lt(&self, other: &Self) -> Result<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn try_le(&self, other: &Self) -> Result<bool> {
        Ok(self.compare(other)? != Ordering::Greater)
    }

    pub fn try_gt(&self, other: &Self) -> Result<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn try_ge(&self, other: &Self) -> Result<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let triple = (self.major, self.minor, self.patch).cmp(&(
            other.major,
            other.minor,
            other.patch,
        ));
        if triple != Ordering::Equal {
            return Some(triple);
        }

        use Stage::*;
        match (&self.stage, &other.stage) {
            (Release, Release) => Some(Ordering::Equal),
            (Release, _) => Some(Ordering::Greater),
            (_, Release) => Some(Ordering::Less),
            (
                Prerelease { kind, serial },
                Prerelease {
                    kind: other_kind,
                    serial: other_serial,
                },
            ) => Some((kind, serial).cmp(&(other_kind, other_serial))),
            (Prerelease { .. }, Development { .. })
            | (Development { .. }, Prerelease { .. }) => None,
            (
                Development { count, hash },
                Development {
                    count: other_count,
                    hash: other_hash,
                },
            ) => match count.cmp(other_count) {
                Ordering::Equal if hash == other_hash => Some(Ordering::Equal),
                Ordering::Equal => None,
                ordering => Some(ordering),
            },
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.release_string())
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        parser::parse(s)
    }
}

impl TryFrom<&SemanticVersion> for semver::Version {
    type Error = VersionError;

    fn try_from(version: &SemanticVersion) -> Result<Self> {
        let mut out = semver::Version::new(
            u64::from(version.major),
            u64::from(version.minor),
            u64::from(version.patch),
        );
        match &version.stage {
            Stage::Release => {}
            Stage::Prerelease { kind, serial } => {
                out.pre = semver::Prerelease::new(&format!("{}.{}", kind, serial))?;
            }
            Stage::Development { count, hash } => {
                out.pre = semver::Prerelease::new(&format!("dev.{}", count))?;
                if let Some(hash) = hash {
                    out.build = semver::BuildMetadata::new(&format!("g{}", hash))?;
                }
            }
        }
        Ok(out)
    }
}
