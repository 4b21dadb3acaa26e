use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};

pub const DEFAULT_REMOTE: &str = "upstream";
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Release {tag}";

const LOCAL_CONFIG_FILE: &str = "./releasetag.toml";
const USER_CONFIG_FILE: &str = ".releasetag.toml";

/// Settings for one release run.
///
/// Built once at startup from command-line options, the environment and an
/// optional config file, then passed by reference to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Remote tags are read from and published to
    pub remote: String,
    /// Report mutating commands instead of running them
    pub dry_run: bool,
    /// Default annotation message; `{tag}` is replaced with the semver tag
    pub message_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: DEFAULT_REMOTE.to_string(),
            dry_run: false,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

impl Config {
    /// Combine explicit settings with file settings and defaults.
    ///
    /// Explicit values (command line or environment) win over the file.
    pub fn resolve(remote: Option<String>, dry_run: bool, file: FileConfig) -> Result<Self> {
        let defaults = Config::default();

        let remote = remote.or(file.remote).unwrap_or(defaults.remote);
        if remote.trim().is_empty() {
            return Err(ReleaseError::config("remote name must not be empty"));
        }

        let message_template = file
            .message_template
            .unwrap_or(defaults.message_template);
        if message_template.trim().is_empty() {
            return Err(ReleaseError::config("message_template must not be empty"));
        }

        Ok(Config {
            remote,
            dry_run,
            message_template,
        })
    }

    /// Default annotation message for a semver tag
    pub fn tag_message(&self, semver: &str) -> String {
        self.message_template.replace("{tag}", semver)
    }
}

/// Optional settings read from a TOML file.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default)]
    pub remote: Option<String>,

    #[serde(default)]
    pub message_template: Option<String>,
}

/// Loads file configuration or returns an empty one.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releasetag.toml` in current directory
/// 3. `.releasetag.toml` in user config directory
/// 4. Empty configuration if no file found
///
/// # Returns
/// * `Ok(FileConfig)` - Loaded or empty configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<FileConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(FileConfig::default());
        }
    } else {
        return Ok(FileConfig::default());
    };

    parse_config(&config_str)
}

/// Parse file configuration from TOML text
pub fn parse_config(text: &str) -> Result<FileConfig> {
    toml::from_str(text).map_err(|e| ReleaseError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.remote, "upstream");
        assert!(!config.dry_run);
        assert_eq!(config.tag_message("v1.2.3"), "Release v1.2.3");
    }

    #[test]
    fn test_explicit_remote_wins_over_file() {
        let file = FileConfig {
            remote: Some("origin".to_string()),
            message_template: None,
        };
        let config = Config::resolve(Some("fork".to_string()), false, file).unwrap();
        assert_eq!(config.remote, "fork");
    }

    #[test]
    fn test_file_remote_used_when_not_explicit() {
        let file = parse_config("remote = \"origin\"\nmessage_template = \"Ship {tag}\"\n").unwrap();
        let config = Config::resolve(None, true, file).unwrap();
        assert_eq!(config.remote, "origin");
        assert!(config.dry_run);
        assert_eq!(config.tag_message("v2.0.0"), "Ship v2.0.0");
    }

    #[test]
    fn test_empty_remote_rejected() {
        let result = Config::resolve(Some("  ".to_string()), false, FileConfig::default());
        assert!(matches!(result, Err(ReleaseError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            parse_config("remote = ["),
            Err(ReleaseError::Config(_))
        ));
    }
}
