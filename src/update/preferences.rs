use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::debug;

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LAST_CHECK_FILE_NAME,
};
use crate::core::UnipmError;

/// User-configurable update behavior, persisted as camelCase JSON in the
/// per-user configuration directory.
///
/// The on-disk field names (`autoCheck`, `checkInterval`, `autoDownload`,
/// `showNotifications`) are part of the config file format and must not
/// change. Missing fields take their defaults; a file with any field of the
/// wrong type is treated as wholly invalid and discarded in favor of
/// defaults - there is no partial adoption of a malformed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfig {
    /// Whether automatic update checks are enabled.
    #[serde(default = "default_auto_check")]
    pub auto_check: bool,

    /// How often to check for updates, in hours. Always at least 1.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// Whether to download updates automatically when one is found.
    #[serde(default = "default_auto_download")]
    pub auto_download: bool,

    /// Whether background checks may print update notifications.
    #[serde(default = "default_show_notifications")]
    pub show_notifications: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            auto_check: default_auto_check(),
            check_interval: default_check_interval(),
            auto_download: default_auto_download(),
            show_notifications: default_show_notifications(),
        }
    }
}

fn default_auto_check() -> bool {
    true
}

/// Check once per day by default.
fn default_check_interval() -> u64 {
    24
}

fn default_auto_download() -> bool {
    false
}

fn default_show_notifications() -> bool {
    true
}

impl UpdateConfig {
    /// Apply a string value to one typed field, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`UnipmError::ConfigInvalid`] when the value does not parse
    /// for the field's type, or when `check-interval` is below 1.
    pub fn set(&mut self, field: ConfigField, value: &str) -> Result<(), UnipmError> {
        match field {
            ConfigField::AutoCheck => self.auto_check = parse_bool(field, value)?,
            ConfigField::AutoDownload => self.auto_download = parse_bool(field, value)?,
            ConfigField::ShowNotifications => {
                self.show_notifications = parse_bool(field, value)?;
            }
            ConfigField::CheckInterval => {
                let hours = value.trim().parse::<u64>().map_err(|_| {
                    UnipmError::ConfigInvalid {
                        reason: format!("'{value}' is not a valid number of hours"),
                    }
                })?;
                if hours < 1 {
                    return Err(UnipmError::ConfigInvalid {
                        reason: "check-interval must be at least 1 hour".to_string(),
                    });
                }
                self.check_interval = hours;
            }
        }
        Ok(())
    }
}

fn parse_bool(field: ConfigField, value: &str) -> Result<bool, UnipmError> {
    value
        .trim()
        .parse::<bool>()
        .map_err(|_| UnipmError::ConfigInvalid {
            reason: format!("'{value}' is not valid for {field}: expected true or false"),
        })
}

/// The closed set of configurable preference fields.
///
/// Keys are matched by their kebab-case CLI spelling or the camelCase JSON
/// spelling; anything else is rejected outright rather than silently
/// coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    AutoCheck,
    CheckInterval,
    AutoDownload,
    ShowNotifications,
}

impl ConfigField {
    /// The kebab-case key used on the command line.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::AutoCheck => "auto-check",
            Self::CheckInterval => "check-interval",
            Self::AutoDownload => "auto-download",
            Self::ShowNotifications => "show-notifications",
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConfigField {
    type Err = UnipmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto-check" | "autoCheck" => Ok(Self::AutoCheck),
            "check-interval" | "checkInterval" => Ok(Self::CheckInterval),
            "auto-download" | "autoDownload" => Ok(Self::AutoDownload),
            "show-notifications" | "showNotifications" => Ok(Self::ShowNotifications),
            other => Err(UnipmError::ConfigInvalid {
                reason: format!("unknown configuration key '{other}'"),
            }),
        }
    }
}

/// Persists update preferences and the last-check timestamp in the per-user
/// configuration directory.
///
/// The directory is created with owner-only permissions (0700) and both
/// files are restricted to owner read/write (0600) on platforms that support
/// POSIX permissions. Nothing is cached between calls - every invocation
/// reloads from disk.
pub struct PreferencesStore {
    config_dir: PathBuf,
}

impl PreferencesStore {
    /// Create a store rooted at `~/.unipm`, honoring the `UNIPM_CONFIG_DIR`
    /// environment override.
    ///
    /// # Errors
    ///
    /// Fails only when the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(CONFIG_DIR_NAME),
        };
        Ok(Self { config_dir })
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// The directory holding config.json, the last-check stamp, and the
    /// installer's lock and script files.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    fn last_check_file(&self) -> PathBuf {
        self.config_dir.join(LAST_CHECK_FILE_NAME)
    }

    /// Load preferences, falling back to defaults on a missing or invalid
    /// file. Invalid files are logged at debug level, never surfaced as
    /// errors.
    pub async fn load(&self) -> UpdateConfig {
        let raw = match fs::read_to_string(self.config_file()).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("Error loading config: {e}");
                }
                return UpdateConfig::default();
            }
        };

        match serde_json::from_str::<UpdateConfig>(&raw) {
            Ok(config) if config.check_interval >= 1 => config,
            Ok(_) => {
                debug!("Config file has an out-of-range checkInterval, using defaults");
                UpdateConfig::default()
            }
            Err(e) => {
                debug!("Invalid config file schema, using defaults: {e}");
                UpdateConfig::default()
            }
        }
    }

    /// Persist preferences, creating the config directory if needed.
    ///
    /// # Errors
    ///
    /// Fails on directory creation, serialization, or write errors.
    pub async fn save(&self, config: &UpdateConfig) -> Result<()> {
        self.ensure_config_dir().await?;

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        let path = self.config_file();
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        restrict_to_owner(&path).await;
        Ok(())
    }

    /// Whether an automatic check is due.
    ///
    /// `false` when `auto_check` is disabled; otherwise `true` when the
    /// last-check stamp is absent, unreadable, or older than
    /// `check_interval` hours.
    pub async fn should_check(&self) -> bool {
        let config = self.load().await;
        if !config.auto_check {
            return false;
        }

        let raw = match fs::read_to_string(self.last_check_file()).await {
            Ok(raw) => raw,
            // If we can't read the stamp, check anyway.
            Err(_) => return true,
        };

        match raw.trim().parse::<i64>() {
            Ok(last_check) => {
                let elapsed_ms = Utc::now().timestamp_millis().saturating_sub(last_check);
                let hours_since_check = elapsed_ms as f64 / (1000.0 * 60.0 * 60.0);
                hours_since_check >= config.check_interval as f64
            }
            Err(_) => true,
        }
    }

    /// Record that a check just happened.
    ///
    /// # Errors
    ///
    /// Fails on directory creation or write errors.
    pub async fn mark_checked(&self) -> Result<()> {
        self.ensure_config_dir().await?;

        let path = self.last_check_file();
        fs::write(&path, Utc::now().timestamp_millis().to_string())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        restrict_to_owner(&path).await;
        Ok(())
    }

    async fn ensure_config_dir(&self) -> Result<()> {
        if self.config_dir.exists() {
            return Ok(());
        }

        fs::create_dir_all(&self.config_dir).await.with_context(|| {
            format!(
                "Failed to create config directory {}",
                self.config_dir.display()
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o700);
            fs::set_permissions(&self.config_dir, permissions)
                .await
                .context("Failed to restrict config directory permissions")?;
        }

        Ok(())
    }
}

/// Restrict a file to owner read/write on POSIX platforms. Best-effort: a
/// failure is logged, not propagated.
async fn restrict_to_owner(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        if let Err(e) = fs::set_permissions(path, permissions).await {
            debug!("Failed to restrict permissions on {}: {e}", path.display());
        }
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}
