use crate::domain::policy::ReleaseGranularity;
use crate::error::{Result, VersionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE_NAME: &str = "pkgversion.toml";

/// Represents the complete configuration for pkgversion.
///
/// Contains the release overrides, the sem-ver trailer keyword map and the
/// tag naming pattern.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub sem_ver: SemVerConfig,

    #[serde(default)]
    pub tags: TagConfig,
}

/// Returns the version used when nothing else knows one.
fn default_version() -> String {
    "0.0.1".to_string()
}

/// Returns the default list of keywords that trigger minor version bumps.
fn default_minor_keywords() -> Vec<String> {
    vec!["feature".to_string(), "deprecation".to_string()]
}

/// Returns the default list of keywords that trigger major version bumps.
fn default_major_keywords() -> Vec<String> {
    vec!["api-break".to_string()]
}

fn default_tag_pattern() -> String {
    "{version}".to_string()
}

/// Release overrides.
///
/// Every field can also be set from the environment, see
/// [`Config::apply_overrides`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// Granularity for "next version" computations
    #[serde(default)]
    pub release_type: Option<ReleaseGranularity>,

    /// Explicit current version, bypassing git history
    #[serde(default)]
    pub release_version: Option<String>,

    /// Pinned target for untagged history
    #[serde(default)]
    pub pre_version: Option<String>,

    #[serde(default = "default_version")]
    pub default_version: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            release_type: None,
            release_version: None,
            pre_version: None,
            default_version: default_version(),
        }
    }
}

/// Keywords of `sem-ver:` commit trailers.
///
/// Only minor and major keywords are listed: any other keyword, `bugfix`
/// included, gives a patch bump.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SemVerConfig {
    #[serde(default = "default_minor_keywords")]
    pub minor_keywords: Vec<String>,

    #[serde(default = "default_major_keywords")]
    pub major_keywords: Vec<String>,
}

impl Default for SemVerConfig {
    fn default() -> Self {
        SemVerConfig {
            minor_keywords: default_minor_keywords(),
            major_keywords: default_major_keywords(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagConfig {
    #[serde(default = "default_tag_pattern")]
    pub pattern: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            pattern: default_tag_pattern(),
        }
    }
}

impl Config {
    /// Apply `RELEASE_TYPE`, `RELEASE_VERSION` and `PRE_VERSION` as read by
    /// `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(release_type) = read("RELEASE_TYPE") {
            self.release.release_type = Some(release_type.parse()?);
        }
        if let Some(version) = read("RELEASE_VERSION") {
            self.release.release_version = Some(version);
        }
        if let Some(version) = read("PRE_VERSION") {
            self.release.pre_version = Some(version);
        }

        Ok(self)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `pkgversion.toml` in current directory
/// 3. `pkgversion.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text)?;
    if !config.tags.pattern.contains("{version}") {
        return Err(VersionError::config(format!(
            "tag pattern '{}' has no {{version}} placeholder",
            config.tags.pattern
        )));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let config = Config::default()
            .apply_overrides(lookup(&[
                ("RELEASE_TYPE", "minor"),
                ("RELEASE_VERSION", "2.0.0"),
                ("PRE_VERSION", "1.9.0"),
            ]))
            .unwrap();

        assert_eq!(config.release.release_type, Some(ReleaseGranularity::Minor));
        assert_eq!(config.release.release_version.as_deref(), Some("2.0.0"));
        assert_eq!(config.release.pre_version.as_deref(), Some("1.9.0"));
    }

    #[test]
    fn test_empty_override_ignored() {
        let config = Config::default()
            .apply_overrides(lookup(&[("RELEASE_VERSION", "  ")]))
            .unwrap();
        assert_eq!(config.release.release_version, None);
    }

    #[test]
    fn test_unknown_release_type() {
        let result = Config::default().apply_overrides(lookup(&[("RELEASE_TYPE", "huge")]));
        assert!(matches!(result, Err(VersionError::Config(_))));
    }

    #[test]
    fn test_parse_config_partial() {
        let config = parse_config(
            r#"
[release]
release_type = "micro"
"#,
        )
        .unwrap();
        assert_eq!(config.release.release_type, Some(ReleaseGranularity::Patch));
        assert_eq!(config.release.default_version, "0.0.1");
        assert_eq!(config.sem_ver, SemVerConfig::default());
    }

    #[test]
    fn test_parse_config_rejects_pattern_without_placeholder() {
        let result = parse_config(
            r#"
[tags]
pattern = "release"
"#,
        );
        assert!(matches!(result, Err(VersionError::Config(_))));
    }
}
