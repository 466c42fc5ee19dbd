//! Release policy: deriving one version from another.

use crate::domain::version::{SemanticVersion, Stage};
use crate::error::{Result, VersionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which component of a version an increment advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseGranularity {
    Major,
    Minor,
    #[default]
    #[serde(alias = "micro")]
    Patch,
    #[serde(rename = "pre", alias = "prerelease")]
    Prerelease,
    #[serde(rename = "dev", alias = "development")]
    Development,
    Post,
    Epoch,
}

impl ReleaseGranularity {
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseGranularity::Major => "major",
            ReleaseGranularity::Minor => "minor",
            ReleaseGranularity::Patch => "patch",
            ReleaseGranularity::Prerelease => "pre",
            ReleaseGranularity::Development => "dev",
            ReleaseGranularity::Post => "post",
            ReleaseGranularity::Epoch => "epoch",
        }
    }
}

impl FromStr for ReleaseGranularity {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(ReleaseGranularity::Major),
            "minor" => Ok(ReleaseGranularity::Minor),
            "patch" | "micro" => Ok(ReleaseGranularity::Patch),
            "pre" | "prerelease" => Ok(ReleaseGranularity::Prerelease),
            "dev" | "development" => Ok(ReleaseGranularity::Development),
            "post" => Ok(ReleaseGranularity::Post),
            "epoch" => Ok(ReleaseGranularity::Epoch),
            other => Err(VersionError::config(format!(
                "Unknown release type: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ReleaseGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The placeholder for "largest practical prior value" when decrementing a
/// zero component.
pub const DECREMENT_SENTINEL: u32 = 9999;

impl SemanticVersion {
    /// Return the next version for `granularity`.
    ///
    /// A patch bump of a prerelease advances the prerelease serial and
    /// leaves the patch level alone; a patch bump of anything else moves to
    /// the next patch release. Minor and major bumps always produce a plain
    /// release. Only major, minor and patch apply to this version model.
    pub fn increment(&self, granularity: ReleaseGranularity) -> Result<Self> {
        match granularity {
            ReleaseGranularity::Patch => match &self.stage {
                Stage::Prerelease { kind, serial } => Ok(SemanticVersion::prerelease(
                    self.major,
                    self.minor,
                    self.patch,
                    *kind,
                    self.bumped(*serial, "prerelease serial")?,
                )),
                _ => Ok(SemanticVersion::new(
                    self.major,
                    self.minor,
                    self.bumped(self.patch, "patch")?,
                )),
            },
            ReleaseGranularity::Minor => Ok(SemanticVersion::new(
                self.major,
                self.bumped(self.minor, "minor")?,
                0,
            )),
            ReleaseGranularity::Major => {
                Ok(SemanticVersion::new(self.bumped(self.major, "major")?, 0, 0))
            }
            other => Err(VersionError::UnsupportedGranularity {
                granularity: other.name().to_string(),
                scheme: "semantic",
            }),
        }
    }

    fn bumped(&self, value: u32, component: &'static str) -> Result<u32> {
        value
            .checked_add(1)
            .ok_or_else(|| VersionError::overflow(self, component))
    }

    /// Return the release immediately preceding this version's release
    /// triple, for serialisations without a sort-before operator.
    ///
    /// Zero components roll over to 9999; the major never goes below 0.
    pub fn decrement(&self) -> Self {
        if self.patch > 0 {
            return SemanticVersion::new(self.major, self.minor, self.patch - 1);
        }
        if self.minor > 0 {
            return SemanticVersion::new(self.major, self.minor - 1, DECREMENT_SENTINEL);
        }
        SemanticVersion::new(
            self.major.saturating_sub(1),
            DECREMENT_SENTINEL,
            DECREMENT_SENTINEL,
        )
    }

    /// Return a development snapshot of this version's release, dropping any
    /// prerelease marker.
    pub fn to_development(&self, count: u32, hash: impl Into<String>) -> Self {
        SemanticVersion::development(self.major, self.minor, self.patch, count, Some(hash))
    }

    /// Discard any prerelease or development marker
    pub fn to_release(&self) -> Self {
        SemanticVersion::new(self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prerelease::PrereleaseType::*;

    #[test]
    fn test_increment_release() {
        let v = SemanticVersion::new(1, 2, 5);
        assert_eq!(
            v.increment(ReleaseGranularity::default()).unwrap(),
            SemanticVersion::new(1, 2, 6)
        );
        assert_eq!(
            v.increment(ReleaseGranularity::Minor).unwrap(),
            SemanticVersion::new(1, 3, 0)
        );
        assert_eq!(
            v.increment(ReleaseGranularity::Major).unwrap(),
            SemanticVersion::new(2, 0, 0)
        );
    }

    #[test]
    fn test_increment_prerelease() {
        let v = SemanticVersion::prerelease(1, 2, 4, Beta, 1);
        assert_eq!(
            v.increment(ReleaseGranularity::Patch).unwrap(),
            SemanticVersion::prerelease(1, 2, 4, Beta, 2)
        );
        assert_eq!(
            v.increment(ReleaseGranularity::Minor).unwrap(),
            SemanticVersion::new(1, 3, 0)
        );
        assert_eq!(
            v.increment(ReleaseGranularity::Major).unwrap(),
            SemanticVersion::new(2, 0, 0)
        );
    }

    #[test]
    fn test_increment_dev_clears_marker() {
        let v = SemanticVersion::development(1, 2, 4, 3, Some("abc"));
        assert_eq!(
            v.increment(ReleaseGranularity::Patch).unwrap(),
            SemanticVersion::new(1, 2, 5)
        );
    }

    #[test]
    fn test_increment_unsupported_granularity() {
        let v = SemanticVersion::new(1, 2, 3);
        for granularity in [
            ReleaseGranularity::Prerelease,
            ReleaseGranularity::Development,
            ReleaseGranularity::Post,
            ReleaseGranularity::Epoch,
        ] {
            assert!(matches!(
                v.increment(granularity),
                Err(VersionError::UnsupportedGranularity { .. })
            ));
        }
    }

    #[test]
    fn test_increment_at_component_limit() {
        let v = SemanticVersion::new(1, 2, u32::MAX);
        assert!(matches!(
            v.increment(ReleaseGranularity::Patch),
            Err(VersionError::Overflow {
                component: "patch",
                ..
            })
        ));
        assert_eq!(
            v.increment(ReleaseGranularity::Minor).unwrap(),
            SemanticVersion::new(1, 3, 0)
        );

        let v = SemanticVersion::new(u32::MAX, u32::MAX, 0);
        assert!(v.increment(ReleaseGranularity::Minor).is_err());
        assert!(v.increment(ReleaseGranularity::Major).is_err());

        let v = SemanticVersion::prerelease(1, 2, 4, Candidate, u32::MAX);
        assert!(matches!(
            v.increment(ReleaseGranularity::Patch),
            Err(VersionError::Overflow { .. })
        ));
    }

    #[test]
    fn test_decrement_nonrelease() {
        let v = SemanticVersion::prerelease(1, 2, 4, Beta, 1);
        assert_eq!(v.decrement(), SemanticVersion::new(1, 2, 3));
    }

    #[test]
    fn test_decrement_rollover() {
        assert_eq!(
            SemanticVersion::new(1, 0, 0).decrement(),
            SemanticVersion::new(0, 9999, 9999)
        );
        assert_eq!(
            SemanticVersion::new(1, 2, 0).decrement(),
            SemanticVersion::new(1, 1, 9999)
        );
        assert_eq!(
            SemanticVersion::new(0, 0, 0).decrement(),
            SemanticVersion::new(0, 9999, 9999)
        );
    }

    #[test]
    fn test_to_development() {
        let expected = SemanticVersion::development(1, 2, 3, 1, Some("foo"));
        assert_eq!(SemanticVersion::new(1, 2, 3).to_development(1, "foo"), expected);
        assert_eq!(
            SemanticVersion::prerelease(1, 2, 3, Candidate, 1).to_development(1, "foo"),
            expected
        );
    }

    #[test]
    fn test_to_release() {
        assert_eq!(
            SemanticVersion::development(1, 2, 3, 1, Some("foo")).to_release(),
            SemanticVersion::new(1, 2, 3)
        );
        assert_eq!(
            SemanticVersion::prerelease(1, 2, 3, Candidate, 1).to_release(),
            SemanticVersion::new(1, 2, 3)
        );
    }

    #[test]
    fn test_granularity_parse() {
        let parse = |s: &str| s.parse::<ReleaseGranularity>();
        assert_eq!(parse("micro").unwrap(), ReleaseGranularity::Patch);
        assert_eq!(parse("Minor").unwrap(), ReleaseGranularity::Minor);
        assert_eq!(parse("pre").unwrap(), ReleaseGranularity::Prerelease);
        assert_eq!(parse("dev").unwrap(), ReleaseGranularity::Development);
        assert!(parse("huge").is_err());
    }

    #[test]
    fn test_granularity_name_round_trip() {
        for granularity in [
            ReleaseGranularity::Major,
            ReleaseGranularity::Minor,
            ReleaseGranularity::Patch,
            ReleaseGranularity::Prerelease,
            ReleaseGranularity::Development,
            ReleaseGranularity::Post,
            ReleaseGranularity::Epoch,
        ] {
            let parsed: ReleaseGranularity = granularity.name().parse().unwrap();
            assert_eq!(parsed, granularity);
        }
    }
}
