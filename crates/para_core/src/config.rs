//! Engine configuration.
//!
//! # Responsibility
//! - Hold every tunable the engine reads (reading speed, category threshold
//!   and keyword tables, backup naming, batch enumeration defaults, current
//!   user).
//! - Load and validate YAML configuration files.
//!
//! # Invariants
//! - Configuration is passed explicitly to components; there is no global
//!   config lookup.
//! - Unknown keys are rejected so typos surface at load time.

use crate::model::note::DEFAULT_READING_SPEED_WPM;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_CATEGORY_THRESHOLD: u32 = 2;
pub const DEFAULT_BACKUP_DIR: &str = ".backups";
pub const DEFAULT_BACKUP_EXTENSION: &str = "bak";
pub const DEFAULT_PATTERN: &str = "*.md";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration load/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: serde_yaml::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "invalid config `{}`: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "invalid config: {source}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Keyword lists for one category, by weight tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordTiers {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

/// Per-category keyword overrides. A present category replaces the built-in
/// table for that category; absent categories keep the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordOverrides {
    pub projects: Option<KeywordTiers>,
    pub areas: Option<KeywordTiers>,
    pub resources: Option<KeywordTiers>,
    pub archive: Option<KeywordTiers>,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Words per minute for reading-time estimates.
    pub reading_speed_wpm: u32,
    /// Minimum winning score; below it the categorizer answers Inbox.
    pub category_threshold: u32,
    pub category_keywords: KeywordOverrides,
    /// Side directory, relative to the document root, holding backups.
    pub backup_dir: String,
    pub backup_extension: String,
    /// Whether batch enumeration descends into subdirectories.
    pub recursive: bool,
    /// File-name glob used when a caller gives no pattern.
    pub default_pattern: String,
    /// Handle treated as "me" by action searches.
    pub user_name: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reading_speed_wpm: DEFAULT_READING_SPEED_WPM,
            category_threshold: DEFAULT_CATEGORY_THRESHOLD,
            category_keywords: KeywordOverrides::default(),
            backup_dir: DEFAULT_BACKUP_DIR.to_string(),
            backup_extension: DEFAULT_BACKUP_EXTENSION.to_string(),
            recursive: true,
            default_pattern: DEFAULT_PATTERN.to_string(),
            user_name: None,
            log_level: None,
            log_dir: None,
        }
    }
}

impl EngineConfig {
    /// Loads and validates a YAML configuration file.
    ///
    /// # Errors
    /// - `Read` when the file cannot be read.
    /// - `Parse` for YAML syntax errors or unknown keys.
    /// - `Invalid` when a value violates a constraint.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            error!(
                "event=config_load module=config status=error error_code=config_read_failed path={}",
                path.display()
            );
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config = Self::parse_yaml(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })?;
        info!(
            "event=config_load module=config status=ok path={}",
            path.display()
        );
        Ok(config)
    }

    /// Parses and validates YAML configuration text. Blank text yields the
    /// default configuration.
    pub fn parse_yaml(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)
            .map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.reading_speed_wpm == 0 {
            return Err(ConfigError::Invalid(
                "reading_speed_wpm must be greater than zero".to_string(),
            ));
        }
        let backup_dir = self.backup_dir.trim();
        if backup_dir.is_empty() || backup_dir == "." || backup_dir == ".." {
            return Err(ConfigError::Invalid(format!(
                "backup_dir `{}` must name a directory",
                self.backup_dir
            )));
        }
        if backup_dir.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "backup_dir `{}` must be a single directory name",
                self.backup_dir
            )));
        }
        let extension = self.backup_extension.trim();
        if extension.is_empty() || extension.contains(['/', '\\', '.']) {
            return Err(ConfigError::Invalid(format!(
                "backup_extension `{}` must be a bare extension such as `bak`",
                self.backup_extension
            )));
        }
        glob::Pattern::new(&self.default_pattern).map_err(|err| {
            ConfigError::Invalid(format!(
                "default_pattern `{}` is not a valid glob: {err}",
                self.default_pattern
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};

    #[test]
    fn blank_text_is_default() {
        assert_eq!(EngineConfig::parse_yaml("  \n").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EngineConfig::parse_yaml(
            "reading_speed_wpm: 250\nuser_name: alice\ncategory_keywords:\n  projects:\n    high: [launch]\n",
        )
        .unwrap();
        assert_eq!(config.reading_speed_wpm, 250);
        assert_eq!(config.user_name.as_deref(), Some("alice"));
        assert_eq!(config.category_threshold, 2);
        assert_eq!(config.backup_dir, ".backups");
        let projects = config.category_keywords.projects.unwrap();
        assert_eq!(projects.high, vec!["launch".to_string()]);
        assert!(projects.low.is_empty());
        assert!(config.category_keywords.areas.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineConfig::parse_yaml("reading_sped: 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EngineConfig::parse_yaml("reading_speed_wpm: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::parse_yaml("backup_dir: a/b\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::parse_yaml("default_pattern: \"[\"\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
