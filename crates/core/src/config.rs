//! Application configuration: defaults, config file, then environment.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{error::FishwatchError, journal::SpotJournal, locale::Locale};

/// Config file location relative to the user's config directory.
pub const CONFIG_FILE: &str = "fishwatch/config.toml";

const DEFAULT_CONFIG: &str = r#"# fishwatch configuration

# Client language of the chat log: en, de, fr, ja or ko.
locale = "en"

# Chat log file to follow. Leave unset to start without a source.
# log_path = "/path/to/chat.log"

# Where discovered fishing spots are remembered.
# journal_path = "/path/to/journal.json"

# Number of recognised events kept on screen.
history_limit = 200

# Fallback polling interval for the chat log, in milliseconds.
poll_interval_ms = 250

# Replay the whole log on start instead of only new lines.
read_from_start = false
"#;

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// Client language the patterns are selected for.
    pub locale: Locale,
    /// Chat log to follow.
    pub log_path: Option<PathBuf>,
    /// Spot journal file.
    pub journal_path: PathBuf,
    /// Maximum number of history entries kept by a session.
    pub history_limit: usize,
    /// Polling fallback for the log follower.
    pub poll_interval_ms: u64,
    /// Read the log from its beginning instead of its end.
    pub read_from_start: bool,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    locale: String,
    #[serde(default)]
    log_path: Option<PathBuf>,
    #[serde(default)]
    journal_path: Option<PathBuf>,
    history_limit: usize,
    poll_interval_ms: u64,
    read_from_start: bool,
}

impl AppConfig {
    /// Load from the default config file and `FISHWATCH_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load using `path` as the config file. A missing file falls back to defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .set_default("locale", Locale::default().code())?
            .set_default("history_limit", 200_i64)?
            .set_default("poll_interval_ms", 250_i64)?
            .set_default("read_from_start", false)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("FISHWATCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        let raw: RawConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        Ok(Self::try_from(raw)?)
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = FishwatchError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let locale = raw.locale.parse()?;
        if raw.history_limit == 0 {
            return Err(FishwatchError::InvalidConfig(
                "history_limit must be at least 1".to_string(),
            ));
        }
        if raw.poll_interval_ms == 0 {
            return Err(FishwatchError::InvalidConfig(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            locale,
            log_path: raw.log_path.filter(|path| !path.as_os_str().is_empty()),
            journal_path: raw
                .journal_path
                .filter(|path| !path.as_os_str().is_empty())
                .unwrap_or_else(SpotJournal::default_path),
            history_limit: raw.history_limit,
            poll_interval_ms: raw.poll_interval_ms,
            read_from_start: raw.read_from_start,
        })
    }
}

/// Default config file path under the user's config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Write the commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_a_file() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("missing.toml"))?;
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.log_path, None);
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert!(!config.read_from_start);
        Ok(())
    }

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fishwatch/config.toml");
        write_default_config(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.history_limit, 200);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
locale = "ja"
log_path = "/tmp/chat.log"
journal_path = "/tmp/journal.json"
history_limit = 5
read_from_start = true
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.locale, Locale::Japanese);
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/chat.log")));
        assert_eq!(config.journal_path, PathBuf::from("/tmp/journal.json"));
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.poll_interval_ms, 250);
        assert!(config.read_from_start);
        Ok(())
    }

    #[test]
    fn unsupported_locale_fails_fast() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "locale = \"zh\"\n")?;

        let err = AppConfig::load_from(&path).expect_err("zh is not supported");
        assert_eq!(
            err.downcast_ref::<FishwatchError>(),
            Some(&FishwatchError::UnsupportedLocale("zh".to_string()))
        );
        Ok(())
    }

    #[test]
    fn zero_history_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "history_limit = 0\n")?;
        let err = AppConfig::load_from(&path).expect_err("zero history must fail");
        assert!(matches!(
            err.downcast_ref::<FishwatchError>(),
            Some(FishwatchError::InvalidConfig(_))
        ));
        Ok(())
    }
}
