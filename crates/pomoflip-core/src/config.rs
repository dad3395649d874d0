//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Default session duration and poll granularity
//! - Sound cue volumes (playback itself is the host's job)
//!
//! Configuration is stored at `~/.config/pomoflip/config.toml`.
//! Set POMOFLIP_ENV=dev to use `~/.config/pomoflip-dev/` instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, CoreError, Result};
use crate::timer::{SessionDuration, DEFAULT_POLL_INTERVAL_MS};

/// Returns `~/.config/pomoflip[-dev]/` based on POMOFLIP_ENV, creating it
/// if needed. The CLI keeps both `config.toml` and its engine state file
/// here.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOFLIP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomoflip-dev")
    } else {
        base_dir.join("pomoflip")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Timer preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Duration preselected at startup. Must be on the catalog (5/15/25).
    #[serde(default = "default_duration_min")]
    pub default_duration_min: u64,
    /// Tick poll granularity for the async driver.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Sound cue preferences. Volumes are percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_click_volume")]
    pub click_volume: u32,
    #[serde(default = "default_completion_volume")]
    pub completion_volume: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomoflip/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sounds: SoundsConfig,
}

// Default functions
fn default_duration_min() -> u64 {
    SessionDuration::DEFAULT.minutes()
}
fn default_tick_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_true() -> bool {
    true
}
fn default_click_volume() -> u32 {
    30
}
fn default_completion_volume() -> u32 {
    50
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_duration_min: default_duration_min(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            click_volume: default_click_volume(),
            completion_volume: default_completion_volume(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            sounds: SoundsConfig::default(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// The configured startup duration, falling back to the catalog default
    /// if the file carries an off-catalog value.
    pub fn default_duration(&self) -> SessionDuration {
        SessionDuration::from_minutes(self.timer.default_duration_min)
            .unwrap_or(SessionDuration::DEFAULT)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the existing type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if key == "timer.default_duration_min" {
            let minutes: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.into(),
                message: format!("'{value}' is not a number"),
            })?;
            if SessionDuration::from_minutes(minutes).is_none() {
                return Err(CoreError::Config(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("{minutes} is not an allowed duration (5, 15, 25)"),
                }));
            }
        }

        let mut json = serde_json::to_value(&*self)?;
        set_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

fn set_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
    let unknown = || CoreError::Config(ConfigError::UnknownKey(key.to_string()));
    let invalid = |message: String| {
        CoreError::Config(ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        })
    };

    let mut parts = key.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => {
                    let n: u64 = value
                        .parse()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }
        current = current.get_mut(part).ok_or_else(unknown)?;
    }
    Err(unknown())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip_preserves_defaults() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.default_duration_min, 25);
        assert_eq!(parsed.timer.tick_interval_ms, 10);
        assert!(parsed.sounds.enabled);
        assert_eq!(parsed.sounds.click_volume, 30);
        assert_eq!(parsed.sounds.completion_volume, 50);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[timer]\ndefault_duration_min = 5\n").unwrap();
        assert_eq!(parsed.default_duration(), SessionDuration::Short);
        assert_eq!(parsed.sounds.completion_volume, 50);
    }

    #[test]
    fn off_catalog_duration_falls_back() {
        let parsed: Config = toml::from_str("[timer]\ndefault_duration_min = 42\n").unwrap();
        assert_eq!(parsed.default_duration(), SessionDuration::DEFAULT);
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.default_duration_min, 25);
        assert!(path.exists());

        // Second load reads the file it just wrote.
        let again = Config::load_from(&path).unwrap();
        assert_eq!(again.timer.tick_interval_ms, 10);
    }

    #[test]
    fn get_and_set_by_dot_path() {
        let mut cfg = Config::default();
        assert_eq!(cfg.get("timer.default_duration_min").as_deref(), Some("25"));
        assert_eq!(cfg.get("sounds.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("sounds.nope"), None);

        cfg.set("timer.default_duration_min", "15").unwrap();
        assert_eq!(cfg.default_duration(), SessionDuration::Medium);

        cfg.set("sounds.enabled", "false").unwrap();
        assert!(!cfg.sounds.enabled);

        assert!(cfg.set("sounds.enabled", "loud").is_err());
        assert!(cfg.set("no.such.key", "1").is_err());
    }

    #[test]
    fn set_rejects_off_catalog_duration() {
        let mut cfg = Config::default();
        let err = cfg.set("timer.default_duration_min", "20").unwrap_err();
        assert!(err.to_string().contains("allowed duration"));
        assert_eq!(cfg.timer.default_duration_min, 25);
    }
}
