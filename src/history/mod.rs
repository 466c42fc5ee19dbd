//! Versions derived from version control history
//!
//! This module turns a commit log into a version. The log comes from a
//! [HistorySource]; the concrete implementations are:
//!
//! - [repository::Git2History]: a real repository read through `git2`
//! - [mock::MockHistory]: an in-memory log for testing
//!
//! # Derivation
//!
//! The newest commit carrying a version tag fixes the last released version
//! and the distance (number of commits above it). With no new commits the
//! tag's version is the answer. Otherwise the `sem-ver:` trailers of the new
//! commits choose a [ReleaseGranularity](crate::domain::ReleaseGranularity),
//! the last version is incremented by it and the result becomes a
//! development snapshot at that distance.
//!
//! ```rust
//! # use pkgversion::history::{derive_version, CommitRecord, VersionAnalyzer};
//! # use pkgversion::domain::TagPattern;
//! let commits = vec![
//!     CommitRecord::new("c3", "Add widgets\n\nsem-ver: feature"),
//!     CommitRecord::new("c2", "Release").with_tag("1.2.3"),
//! ];
//! let version = derive_version(
//!     &commits,
//!     "c3",
//!     None,
//!     &VersionAnalyzer::default(),
//!     &TagPattern::default(),
//! )?;
//! assert_eq!(version.release_string(), "1.3.0.dev1.gc3");
//! # Ok::<(), pkgversion::VersionError>(())
//! ```

pub mod analyzer;
pub mod mock;
pub mod repository;

pub use analyzer::VersionAnalyzer;
pub use mock::MockHistory;
pub use repository::Git2History;

use crate::domain::{SemanticVersion, Tag, TagPattern};
use crate::error::{Result, VersionError};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

const SEM_VER_TRAILER: &str = "sem-ver:";

/// One commit of a history, as far as versioning cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// The commit hash (shortened)
    pub hash: String,
    /// Names of the tags pointing at this commit
    pub tags: BTreeSet<String>,
    /// The full commit message
    pub message: String,
}

impl CommitRecord {
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        CommitRecord {
            hash: hash.into(),
            tags: BTreeSet::new(),
            message: message.into(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Keywords of the `sem-ver:` trailer lines in the message.
    ///
    /// The trailer name is case-insensitive; values are comma separated.
    pub fn sem_ver_keywords(&self) -> Vec<String> {
        self.message
            .lines()
            .map(str::trim_start)
            .filter_map(|line| {
                let name = line.get(..SEM_VER_TRAILER.len())?;
                if name.eq_ignore_ascii_case(SEM_VER_TRAILER) {
                    line.get(SEM_VER_TRAILER.len()..)
                } else {
                    None
                }
            })
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Read access to a commit history
///
/// ## Errors
///
/// Failures to reach the history at all (no repository, unborn branch)
/// surface as [VersionError::Git] or [VersionError::Io], which callers treat
/// as "version unknown" rather than as a fault of the version model.
pub trait HistorySource: Send {
    /// Short hash of the commit at HEAD
    fn head_hash(&self) -> Result<String>;

    /// Commits reachable from HEAD, newest first
    fn commits(&self) -> Result<Vec<CommitRecord>>;
}

/// Write access to tags, for recording a new release
pub trait TagTarget {
    /// Whether a tag called `name` exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create a lightweight tag called `name` on HEAD
    fn create_tag(&self, name: &str) -> Result<()>;
}

/// Non-fatal problems met while reading a history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryWarning {
    /// Tag follows the tag pattern but its version does not parse
    UnparsableTag { tag: String, reason: String },
    /// No commit carries a version tag
    NoVersionTags { commit_count: usize },
}

impl fmt::Display for HistoryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            HistoryWarning::NoVersionTags { commit_count } => {
                write!(
                    f,
                    "No version tags found; counting all {} commits from the root",
                    commit_count
                )
            }
        }
    }
}

/// Newest version tag in `commits` and how many commits sit above it.
///
/// With several version tags on one commit the greatest wins.
pub fn last_tagged_version(
    commits: &[CommitRecord],
    pattern: &TagPattern,
) -> Result<Option<(SemanticVersion, usize)>> {
    for (distance, commit) in commits.iter().enumerate() {
        if let Some(version) = newest_tag_version(commit, pattern)? {
            return Ok(Some((version, distance)));
        }
    }

    warn!("{}", HistoryWarning::NoVersionTags {
        commit_count: commits.len()
    });
    Ok(None)
}

/// Greatest version among the tags of `commit`
pub fn newest_tag_version(
    commit: &CommitRecord,
    pattern: &TagPattern,
) -> Result<Option<SemanticVersion>> {
    let mut newest: Option<SemanticVersion> = None;

    for tag in &commit.tags {
        let Some(text) = pattern.extract(tag)? else {
            continue;
        };
        let version = match SemanticVersion::parse(Tag::new(text).version_part()) {
            Ok(version) => version,
            Err(err) => {
                warn!(
                    "{}",
                    HistoryWarning::UnparsableTag {
                        tag: tag.clone(),
                        reason: err.to_string(),
                    }
                );
                continue;
            }
        };

        newest = match newest {
            Some(current) if !version.try_gt(&current)? => Some(current),
            _ => Some(version),
        };
    }

    Ok(newest)
}

/// Compute the version of `head_hash` from `commits` (newest first).
///
/// When `target` is given it pins the next release: the history may not
/// call for anything greater, and untagged commits become development
/// snapshots of the target rather than of the computed version.
pub fn derive_version(
    commits: &[CommitRecord],
    head_hash: &str,
    target: Option<&SemanticVersion>,
    analyzer: &VersionAnalyzer,
    pattern: &TagPattern,
) -> Result<SemanticVersion> {
    let (last, distance) = match last_tagged_version(commits, pattern)? {
        Some((version, distance)) => (version, distance),
        None => (SemanticVersion::new(0, 0, 0), commits.len()),
    };

    let computed = if distance == 0 {
        last.clone()
    } else {
        let granularity = analyzer.analyze_commits(&commits[..distance]);
        debug!(
            last = %last,
            distance,
            granularity = %granularity,
            "incrementing from last tagged version"
        );
        last.increment(granularity)?
    };

    if let Some(target) = target {
        if computed.try_gt(target)? {
            return Err(VersionError::TargetVersionExceeded {
                computed: computed.release_string(),
                target: target.release_string(),
            });
        }
    }

    if distance == 0 {
        info!(version = %last, "no commits since last version");
        return Ok(last);
    }

    let count = u32::try_from(distance).unwrap_or(u32::MAX);
    Ok(target.unwrap_or(&computed).to_development(count, head_hash))
}

/// Version of `source` at HEAD.
///
/// A version tag on HEAD itself, or failing that `pre_version`, is the
/// pinned target for [derive_version].
pub fn version_from_history<S: HistorySource + ?Sized>(
    source: &S,
    pre_version: Option<&str>,
    analyzer: &VersionAnalyzer,
    pattern: &TagPattern,
) -> Result<SemanticVersion> {
    let commits = source.commits()?;
    let head_hash = source.head_hash()?;

    let tagged = match commits.first() {
        Some(head) => newest_tag_version(head, pattern)?,
        None => None,
    };
    let target = match tagged {
        Some(version) => Some(version),
        None => pre_version.map(SemanticVersion::parse).transpose()?,
    };

    derive_version(&commits, &head_hash, target.as_ref(), analyzer, pattern)
}
