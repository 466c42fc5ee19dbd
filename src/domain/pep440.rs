//! PEP 440 versions and their increment rules.
//!
//! This grammar variant carries the epoch, post-release and development
//! segments the semantic model has no room for, so it is the one that
//! honours the `epoch`, `pre`, `post` and `dev` granularities.

use crate::domain::policy::ReleaseGranularity;
use crate::domain::prerelease::PrereleaseType;
use crate::error::{Result, VersionError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const PEP440_PATTERN: &str = r"(?ix)
    ^\s*v?
    (?:(?P<epoch>[0-9]+)!)?
    (?P<release>[0-9]+(?:\.[0-9]+)*)
    (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_.]?(?P<pre_n>[0-9]+)?)?
    (?:(?:-(?P<post_n1>[0-9]+))|(?:[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?))?
    (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
    (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
    \s*$";

/// Label of a PEP 440 pre-release segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreLabel {
    /// `a`, `b` or `rc`
    Marker(PrereleaseType),
    /// A pre-release started by a `pre` bump, rendered `.preN`
    Pre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pep440Pre {
    pub label: PreLabel,
    pub number: u32,
}

/// A PEP 440 public version with optional local label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pep440Version {
    pub epoch: u32,
    pub release: Vec<u32>,
    pub pre: Option<Pep440Pre>,
    pub post: Option<u32>,
    pub dev: Option<u32>,
    pub local: Option<String>,
}

fn number(text: &str, digits: &str) -> Result<u32> {
    digits.parse::<u32>().map_err(|_| {
        VersionError::malformed(text, format!("component '{}' is out of range", digits))
    })
}

impl Pep440Version {
    /// Parse a PEP 440 version.
    ///
    /// Strings outside the PEP 440 grammar fail with `LegacyVersion`.
    pub fn parse(text: &str) -> Result<Self> {
        let re = Regex::new(PEP440_PATTERN)?;
        let captures = re
            .captures(text)
            .ok_or_else(|| VersionError::LegacyVersion(text.to_string()))?;

        let epoch = match captures.name("epoch") {
            Some(m) => number(text, m.as_str())?,
            None => 0,
        };

        let release = captures
            .name("release")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split('.')
            .map(|part| number(text, part))
            .collect::<Result<Vec<u32>>>()?;

        let pre = match captures.name("pre_l") {
            Some(label) => {
                let kind = match label.as_str().to_lowercase().as_str() {
                    "a" | "alpha" => PrereleaseType::Alpha,
                    "b" | "beta" => PrereleaseType::Beta,
                    _ => PrereleaseType::Candidate,
                };
                let n = match captures.name("pre_n") {
                    Some(m) => number(text, m.as_str())?,
                    None => 0,
                };
                Some(Pep440Pre {
                    label: PreLabel::Marker(kind),
                    number: n,
                })
            }
            None => None,
        };

        let post = match (
            captures.name("post_n1"),
            captures.name("post_l"),
            captures.name("post_n2"),
        ) {
            (Some(m), _, _) | (None, Some(_), Some(m)) => Some(number(text, m.as_str())?),
            (None, Some(_), None) => Some(0),
            (None, None, _) => None,
        };

        let dev = match (captures.name("dev_l"), captures.name("dev_n")) {
            (Some(_), Some(m)) => Some(number(text, m.as_str())?),
            (Some(_), None) => Some(0),
            (None, _) => None,
        };

        let local = captures
            .name("local")
            .map(|m| m.as_str().to_lowercase().replace(['-', '_'], "."));

        Ok(Pep440Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// Return the next version for `granularity`.
    ///
    /// Release segments past the third survive only post and dev bumps.
    pub fn increment(&self, granularity: ReleaseGranularity) -> Result<Self> {
        let mut major = self.release.first().copied().unwrap_or(0);
        let mut minor = self.release.get(1).copied();
        let mut micro = self.release.get(2).copied();
        let mut epoch = self.epoch;
        let mut pre = self.pre;
        let mut post = self.post;
        let mut dev = self.dev;
        let next = |value: u32, component: &'static str| {
            value
                .checked_add(1)
                .ok_or_else(|| VersionError::overflow(self, component))
        };

        match granularity {
            ReleaseGranularity::Epoch => {
                epoch = next(epoch, "epoch")?;
                major = 1;
                minor = Some(0);
                micro = Some(0);
                (pre, post, dev) = (None, None, None);
            }
            ReleaseGranularity::Major => {
                major = next(major, "major")?;
                minor = minor.map(|_| 0);
                micro = micro.map(|_| 0);
                (pre, post, dev) = (None, None, None);
            }
            ReleaseGranularity::Minor => {
                minor = Some(match minor {
                    Some(m) => next(m, "minor")?,
                    None => 1,
                });
                micro = micro.map(|_| 0);
                (pre, post, dev) = (None, None, None);
            }
            ReleaseGranularity::Patch => {
                match micro {
                    None => {
                        minor = Some(minor.unwrap_or(0));
                        micro = Some(1);
                    }
                    // the release of a prerelease is the next version
                    Some(m) if pre.is_none() => micro = Some(next(m, "micro")?),
                    Some(_) => {}
                }
                (pre, post, dev) = (None, None, None);
            }
            ReleaseGranularity::Prerelease => {
                match pre {
                    Some(ref mut p) => p.number = next(p.number, "pre-release number")?,
                    None => {
                        pre = Some(Pep440Pre {
                            label: PreLabel::Pre,
                            number: 1,
                        });
                        minor = Some(minor.unwrap_or(0));
                        micro = Some(match micro {
                            Some(m) => next(m, "micro")?,
                            None => 1,
                        });
                    }
                }
                post = None;
            }
            ReleaseGranularity::Post => {
                post = Some(match post {
                    Some(p) => next(p, "post-release number")?,
                    None => 1,
                });
                dev = None;
            }
            ReleaseGranularity::Development => {
                dev = Some(match dev {
                    Some(d) => next(d, "dev number")?,
                    None => 1,
                });
            }
        }

        let mut release = vec![major];
        release.extend(minor);
        release.extend(micro);
        if matches!(
            granularity,
            ReleaseGranularity::Post | ReleaseGranularity::Development
        ) {
            release.extend(self.release.iter().skip(3));
        }

        Ok(Pep440Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local: self.local.clone(),
        })
    }
}

impl fmt::Display for Pep440Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        f.write_str(&release.join("."))?;

        if let Some(pre) = &self.pre {
            match pre.label {
                PreLabel::Pre => f.write_str(".pre")?,
                PreLabel::Marker(kind) => write!(f, "{}", kind)?,
            }
            if pre.number > 0 {
                write!(f, "{}", pre.number)?;
            }
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{}", local)?;
        }
        Ok(())
    }
}

impl FromStr for Pep440Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        Pep440Version::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(text: &str, granularity: ReleaseGranularity) -> String {
        Pep440Version::parse(text)
            .unwrap()
            .increment(granularity)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_parse_full() {
        let v = Pep440Version::parse("1!1.2.3rc4.post5.dev6+Ubuntu-1").unwrap();
        assert_eq!(v.epoch, 1);
        assert_eq!(v.release, vec![1, 2, 3]);
        assert_eq!(
            v.pre,
            Some(Pep440Pre {
                label: PreLabel::Marker(PrereleaseType::Candidate),
                number: 4
            })
        );
        assert_eq!(v.post, Some(5));
        assert_eq!(v.dev, Some(6));
        assert_eq!(v.local.as_deref(), Some("ubuntu.1"));
    }

    #[test]
    fn test_parse_normalises_labels() {
        let v = Pep440Version::parse("1.0alpha2").unwrap();
        assert_eq!(v.to_string(), "1.0a2");
        let v = Pep440Version::parse("1.0-1").unwrap();
        assert_eq!(v.post, Some(1));
        let v = Pep440Version::parse("1.0.c1").unwrap();
        assert_eq!(v.to_string(), "1.0rc1");
    }

    #[test]
    fn test_parse_legacy_fails() {
        assert!(matches!(
            Pep440Version::parse("1.2.3.g39485hdjk"),
            Err(VersionError::LegacyVersion(_))
        ));
    }

    #[test]
    fn test_patch_of_short_release() {
        assert_eq!(bump("2014b", ReleaseGranularity::Patch), "2014.0.1");
        assert_eq!(bump("1.2.a1", ReleaseGranularity::Patch), "1.2.1");
    }

    #[test]
    fn test_pre_of_bare_major() {
        assert_eq!(bump("2014", ReleaseGranularity::Prerelease), "2014.0.1.pre1");
    }

    #[test]
    fn test_dev_keeps_extra_release_segments() {
        assert_eq!(
            bump("2.1.3.45.654", ReleaseGranularity::Development),
            "2.1.3.45.654.dev1"
        );
        assert_eq!(bump("2.1.3.45.654", ReleaseGranularity::Patch), "2.1.4");
    }

    #[test]
    fn test_post_clears_dev() {
        assert_eq!(bump("1.2.3.dev4", ReleaseGranularity::Post), "1.2.3.post1");
    }

    #[test]
    fn test_local_is_kept() {
        assert_eq!(bump("1.2.3+abc", ReleaseGranularity::Patch), "1.2.4+abc");
    }
}
