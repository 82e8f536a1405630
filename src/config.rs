//! User configuration, read from `<config_dir>/routine-tui/config.toml`.
//!
//! Every key is optional. A missing file yields the defaults; a file that
//! exists but does not parse is an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::routine::MutationPolicy;

const APP_DIR: &str = "routine-tui";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON document holding all routines.
    pub data_file: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub mutation_policy: MutationPolicy,
    pub theme: ThemeSettings,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().map(|d| d.join(APP_DIR));
        Self {
            data_file: data_dir
                .as_ref()
                .map(|d| d.join("data.json"))
                .unwrap_or_else(|| PathBuf::from("data.json")),
            log_level: "info".to_string(),
            log_dir: data_dir
                .map(|d| d.join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
            mutation_policy: MutationPolicy::default(),
            theme: ThemeSettings::default(),
        }
    }
}

/// Color overrides on top of a named preset. Colors are `#rrggbb` or names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub preset: Option<String>,
    pub today_fg: Option<String>,
    pub today_bg: Option<String>,
    pub selected_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub header_fg: Option<String>,
    pub dim_fg: Option<String>,
    pub border_fg: Option<String>,
    pub status_fg: Option<String>,
    pub status_bg: Option<String>,
    pub once_fg: Option<String>,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Load from the standard location, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = Config::from_toml(
            r##"
            data_file = "/tmp/routines.json"
            log_level = "debug"
            mutation_policy = "strict"

            [theme]
            preset = "nord"
            once_fg = "#ffcc00"
            "##,
        )
        .unwrap();
        assert_eq!(cfg.data_file, PathBuf::from("/tmp/routines.json"));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.mutation_policy, MutationPolicy::Strict);
        assert_eq!(cfg.theme.preset.as_deref(), Some("nord"));
        assert_eq!(cfg.theme.once_fg.as_deref(), Some("#ffcc00"));
        assert_eq!(cfg.log_dir, Config::default().log_dir);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Config::from_toml("mutation_policy = \"lenient\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults_and_bad_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::from_path(&path).unwrap(), Config::default());

        std::fs::write(&path, "log_level = [").unwrap();
        assert!(matches!(
            Config::from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
