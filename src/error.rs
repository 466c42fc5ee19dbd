use thiserror::Error;

/// Unified error type for version parsing, ordering and derivation
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Malformed version '{input}': {reason}")]
    MalformedVersion { input: String, reason: String },

    #[error("Invalid version construction: {0}")]
    InvalidConstruction(String),

    #[error("Versions {left} and {right} have no defined order")]
    IncomparableVersions { left: String, right: String },

    #[error("git history requires a target version of {computed}, but target version is {target}")]
    TargetVersionExceeded { computed: String, target: String },

    #[error("Cannot increment {scheme} version by '{granularity}'")]
    UnsupportedGranularity {
        granularity: String,
        scheme: &'static str,
    },

    #[error("Cannot increment the {component} of {version}: value out of range")]
    Overflow {
        version: String,
        component: &'static str,
    },

    #[error("{0} is considered a legacy version and does not support automatic incrementing")]
    LegacyVersion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("semver conversion failed: {0}")]
    Semver(#[from] semver::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Convenience type alias for Results in pkgversion
pub type Result<T> = std::result::Result<T, VersionError>;

impl VersionError {
    /// Create a malformed-version error for `input`
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        VersionError::MalformedVersion {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VersionError::Config(msg.into())
    }

    /// Create an ordering error for two versions
    pub fn incomparable(left: impl ToString, right: impl ToString) -> Self {
        VersionError::IncomparableVersions {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Create an overflow error for incrementing `component` of `version`
    pub fn overflow(version: impl ToString, component: &'static str) -> Self {
        VersionError::Overflow {
            version: version.to_string(),
            component,
        }
    }

    /// True for failures of the outside world (repository access, file
    /// system) rather than of the version model itself.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, VersionError::Git(_) | VersionError::Io(_))
    }
}
