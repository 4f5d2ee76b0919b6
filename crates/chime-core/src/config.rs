//! TOML-based application configuration.
//!
//! Stores the trigger window, the worker source reference, and the
//! notification identity inputs. Stored at `~/.config/chime/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::window::DEFAULT_WINDOW_SECONDS;

/// Returns `~/.config/chime[-dev]/` based on CHIME_ENV.
///
/// Set CHIME_ENV=dev to use the development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CHIME_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("chime-dev")
    } else {
        base_dir.join("chime")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Path to the on-disk config file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("config.toml"))
}

/// Watch/polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Trigger window in seconds before each target.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Opaque reference handed to the worker spawner. The bundled interval
    /// spawner reads it as a cadence spec ("1s", "500ms", "2").
    #[serde(default = "default_worker_source")]
    pub worker_source: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Page location the notification tag and icon derive from.
    #[serde(default = "default_location")]
    pub location: String,
    /// Path to the alarm sound file (optional). No sound plays when unset.
    #[serde(default)]
    pub alarm: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/chime/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_window_seconds() -> u64 {
    DEFAULT_WINDOW_SECONDS
}
fn default_worker_source() -> String {
    "1s".to_string()
}
fn default_location() -> String {
    "http://localhost/chime/".to_string()
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            worker_source: default_worker_source(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            alarm: None,
        }
    }
}

impl Config {
    /// Load from disk, or write and return the default on first run.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a value by dotted path, e.g. "watch.window_seconds".
    pub fn get(&self, key: &str) -> Option<String> {
        let root = serde_json::to_value(self).ok()?;
        let mut current = &root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(match current {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set a value by dotted path, coercing to the existing field's type.
    /// Does not persist; call `save` afterwards.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut root =
            serde_json::to_value(&self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut root, key, value)?;
        *self = serde_json::from_value(root).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(())
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(invalid("config key is empty".to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| invalid("unknown config key".to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| invalid("unknown config key".to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Null | serde_json::Value::String(_) => {
                        serde_json::Value::String(value.to_string())
                    }
                    _ => return Err(invalid("unsupported config key type".to_string())),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| invalid("unknown config key".to_string()))?;
        }

        Err(invalid("unknown config key".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.watch.window_seconds, 60);
        assert_eq!(config.watch.worker_source, "1s");
        assert!(config.notifications.alarm.is_none());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.watch.window_seconds = 120;
        config.notifications.alarm = Some("/tmp/alarm.ogg".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.watch.window_seconds, 120);
        assert_eq!(loaded.notifications.alarm.as_deref(), Some("/tmp/alarm.ogg"));
    }

    #[test]
    fn load_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.watch.window_seconds, 60);
        assert!(path.exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[watch]\nwindow_seconds = 30\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.watch.window_seconds, 30);
        assert_eq!(config.watch.worker_source, "1s");
    }

    #[test]
    fn get_by_dotted_path() {
        let config = Config::default();
        assert_eq!(config.get("watch.window_seconds").as_deref(), Some("60"));
        assert_eq!(config.get("watch.worker_source").as_deref(), Some("1s"));
        assert!(config.get("watch.nope").is_none());
    }

    #[test]
    fn set_coerces_by_existing_type() {
        let mut config = Config::default();
        config.set("watch.window_seconds", "90").unwrap();
        assert_eq!(config.watch.window_seconds, 90);

        config.set("notifications.alarm", "/tmp/bell.ogg").unwrap();
        assert_eq!(config.notifications.alarm.as_deref(), Some("/tmp/bell.ogg"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_value() {
        let mut config = Config::default();
        assert!(config.set("watch.nope", "1").is_err());
        assert!(config.set("watch.window_seconds", "soon").is_err());
    }
}
