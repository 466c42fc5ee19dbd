//! Pre-release markers: alpha (`a`), beta (`b`) and release candidate (`rc`).

use crate::error::{Result, VersionError};
use std::fmt;
use std::str::FromStr;

/// Pre-release identifier type
///
/// Variants are declared in precedence order so the derived `Ord` gives
/// `a < b < rc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrereleaseType {
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    Candidate,
}

impl PrereleaseType {
    /// Parse a pre-release marker. Only the short forms `a`, `b` and `rc`
    /// are accepted.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// The marker as written inside a version string
    pub fn marker(&self) -> &'static str {
        match self {
            PrereleaseType::Alpha => "a",
            PrereleaseType::Beta => "b",
            PrereleaseType::Candidate => "rc",
        }
    }

    /// The long name used in version tuples
    pub fn long_name(&self) -> &'static str {
        match self {
            PrereleaseType::Alpha => "alpha",
            PrereleaseType::Beta => "beta",
            PrereleaseType::Candidate => "candidate",
        }
    }
}

impl FromStr for PrereleaseType {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "a" => Ok(PrereleaseType::Alpha),
            "b" => Ok(PrereleaseType::Beta),
            "rc" => Ok(PrereleaseType::Candidate),
            other => Err(VersionError::malformed(
                other,
                "pre-release type must be one of a, b or rc",
            )),
        }
    }
}

impl fmt::Display for PrereleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}
