//! Version string parsing.
//!
//! Parsing runs in two stages. The numeric prefix stage collects up to three
//! leading numeric segments, splitting a digit-then-letters segment such as
//! the `1a2` of `0.1a2` when fewer than three were found. The tail stage
//! classifies whatever is left into a [`Tail`].
//!
//! Accepted forms include the canonical `1.2.4.0rc1` and `1.2.4.dev5.g12`,
//! a dev hash given as a local label (`1.2.3.dev1+abc`), the legacy
//! `1.2.0rc1`, `2014.2.b2` and `0.10.1.3.g83bef74`, and short forms like `1`
//! or `0.g83bef74`.

use crate::domain::prerelease::PrereleaseType;
use crate::domain::version::{SemanticVersion, Stage};
use crate::error::{Result, VersionError};

/// What the segments after `major.minor.patch` describe
#[derive(Debug, Clone, PartialEq, Eq)]
enum Tail {
    None,
    Prerelease { kind: PrereleaseType, serial: u32 },
    /// `1.2.3.4.g1234`: a bare number is the distance from the last tag
    LegacyDev { count: u32, hash: Option<String> },
    Dev { count: u32, hash: Option<String> },
    /// `1.2.3.g1234`: a hash alone implies a dev count of 1
    GitHash { hash: String },
}

struct NumericPrefix<'a> {
    release: [u32; 3],
    tail: Vec<&'a str>,
}

pub(crate) fn parse(text: &str) -> Result<SemanticVersion> {
    let prefix = split_numeric_prefix(text)?;
    let [major, minor, patch] = prefix.release;

    let stage = match classify_tail(text, &prefix.tail)? {
        Tail::None => Stage::Release,
        Tail::Prerelease { kind, serial } => Stage::Prerelease { kind, serial },
        Tail::LegacyDev { count, hash } | Tail::Dev { count, hash } => {
            Stage::Development { count, hash }
        }
        Tail::GitHash { hash } => Stage::Development {
            count: 1,
            hash: Some(hash),
        },
    };

    Ok(SemanticVersion {
        major,
        minor,
        patch,
        stage,
    })
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number(text: &str, segment: &str) -> Result<u32> {
    if !is_numeric(segment) {
        return Err(VersionError::malformed(
            text,
            format!("'{}' is not a number", segment),
        ));
    }
    segment.parse::<u32>().map_err(|_| {
        VersionError::malformed(text, format!("component '{}' is out of range", segment))
    })
}

fn leading_digits(segment: &str) -> usize {
    segment.len() - segment.trim_start_matches(|c: char| c.is_ascii_digit()).len()
}

fn split_numeric_prefix(text: &str) -> Result<NumericPrefix<'_>> {
    let segments: Vec<&str> = text.split('.').collect();

    let mut release = Vec::with_capacity(3);
    let mut index = 0;
    while release.len() < 3 && index < segments.len() && is_numeric(segments[index]) {
        release.push(parse_number(text, segments[index])?);
        index += 1;
    }

    if release.is_empty() {
        return Err(VersionError::malformed(text, "no leading numeric component"));
    }

    let mut tail: Vec<&str> = segments[index..].to_vec();

    if release.len() < 3 {
        // X.YaZ: the Y is a release component, not a lead-in to the prerelease
        if let Some(first) = tail.first().copied() {
            let digits = leading_digits(first);
            if digits > 0 {
                release.push(parse_number(text, &first[..digits])?);
                tail[0] = &first[digits..];
            }
        }
        release.resize(3, 0);
    }

    Ok(NumericPrefix {
        release: [release[0], release[1], release[2]],
        tail,
    })
}

fn classify_tail(text: &str, tail: &[&str]) -> Result<Tail> {
    let Some((first, rest)) = tail.split_first() else {
        return Ok(Tail::None);
    };

    if is_numeric(first) {
        let count = parse_number(text, first)?;
        let hash = trailing_hash(text, rest)?;
        return Ok(Tail::LegacyDev { count, hash });
    }

    let (prerelease, rest) = if first.starts_with(['0', 'a', 'b', 'r']) {
        (Some(parse_prerelease(text, first)?), rest)
    } else {
        (None, tail)
    };

    let marker = match rest.split_first() {
        Some((segment, trailing)) => Some(classify_dev(text, segment, trailing)?),
        None => None,
    };

    match (prerelease, marker) {
        (Some((kind, _)), Some(_)) => Err(VersionError::InvalidConstruction(format!(
            "cannot have prerelease and dev strings in '{}' ({})",
            text, kind
        ))),
        (Some((kind, serial)), None) => Ok(Tail::Prerelease { kind, serial }),
        (None, Some(marker)) => Ok(marker),
        (None, None) => Ok(Tail::None),
    }
}

/// `0rc1`, `rc1`, `b2`, `0a`: leading digits are dropped, the alphabetic run
/// is the type and the remaining digits the serial.
fn parse_prerelease(text: &str, segment: &str) -> Result<(PrereleaseType, u32)> {
    let stripped = &segment[leading_digits(segment)..];
    let alpha_len = stripped.len()
        - stripped
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .len();
    let (kind, serial) = stripped.split_at(alpha_len);

    let kind = PrereleaseType::parse(kind).map_err(|_| {
        VersionError::malformed(text, format!("unknown pre-release segment '{}'", segment))
    })?;
    let serial = if serial.is_empty() {
        0
    } else {
        parse_number(text, serial)?
    };

    Ok((kind, serial))
}

fn classify_dev(text: &str, segment: &str, trailing: &[&str]) -> Result<Tail> {
    if let Some(dev) = segment.strip_prefix("dev") {
        // `dev1+abc` / `dev1+gabc` carry the hash as a local label
        let (count, hash) = match dev.split_once('+') {
            Some((count, local)) => {
                if !trailing.is_empty() {
                    return Err(VersionError::malformed(
                        text,
                        format!("unexpected segments after hash: {}", trailing.join(".")),
                    ));
                }
                (count, Some(local_hash(text, local)?))
            }
            None => (dev, trailing_hash(text, trailing)?),
        };
        let count = parse_number(text, count)?;
        Ok(Tail::Dev { count, hash })
    } else if let Some(hash) = segment.strip_prefix('g') {
        if !trailing.is_empty() {
            return Err(VersionError::malformed(
                text,
                format!("unexpected segments after hash: {}", trailing.join(".")),
            ));
        }
        Ok(Tail::GitHash {
            hash: hash.to_string(),
        })
    } else {
        Err(VersionError::malformed(
            text,
            format!("unknown remainder '{}'", segment),
        ))
    }
}

fn local_hash(text: &str, local: &str) -> Result<String> {
    let hash = local.strip_prefix('g').unwrap_or(local);
    if hash.is_empty() || !hash.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(VersionError::malformed(
            text,
            format!("invalid source hash '{}'", local),
        ));
    }
    Ok(hash.to_string())
}

fn trailing_hash(text: &str, trailing: &[&str]) -> Result<Option<String>> {
    match trailing {
        [] => Ok(None),
        [segment] => match segment.strip_prefix('g') {
            Some(hash) => Ok(Some(hash.to_string())),
            None => Err(VersionError::malformed(
                text,
                format!("expected a g<hash> segment, found '{}'", segment),
            )),
        },
        _ => Err(VersionError::malformed(
            text,
            format!("too many trailing segments: {}", trailing.join(".")),
        )),
    }
}
