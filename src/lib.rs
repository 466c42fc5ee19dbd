//! Parse, order, render and derive package versions.
//!
//! [SemanticVersion] understands the canonical `1.2.4.0rc1` /
//! `1.2.4.dev5.g12` forms as well as several legacy spellings, renders to
//! release, debian, rpm and brief strings, and is incremented by a
//! [ReleaseGranularity]. [history] derives versions from git tags and
//! `sem-ver:` commit trailers; [resolve] chains overrides, package metadata
//! and history into "the current version".

pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod resolve;

pub use config::{load_config, Config};
pub use domain::{
    Pep440Version, PrereleaseType, ReleaseGranularity, RenderStyle, SemanticVersion, Stage,
};
pub use error::{Result, VersionError};
pub use resolve::{Resolver, TagOutcome};
