//! Configuration management for Counter-Strafe TestKit
//!
//! Provides persistent configuration that is loaded from and saved to a
//! platform-specific config file.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/counterstrafe-testkit/config.toml` |
//! | macOS | `~/Library/Application Support/counterstrafe-testkit/config.toml` |
//! | Windows | `%APPDATA%\counterstrafe-testkit\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use counterstrafe_testkit::Config;
//!
//! // Load existing config or use defaults
//! let mut config = Config::load().unwrap_or_default();
//!
//! // Tighten the filter
//! config.detector.filter_threshold_ms = 60.0;
//!
//! // Save to disk
//! config.save().expect("Failed to save config");
//! ```

use crate::analysis::DEFAULT_STATS_WINDOW;
use crate::detector::DetectorConfig;
use crate::error::CoreError;
use crate::history::DEFAULT_CAPACITY;
use crate::keyboard::KeyMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_DIR: &str = "counterstrafe-testkit";

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Values parsed but are out of range
    #[error("Invalid config: {0}")]
    Invalid(#[from] CoreError),
}

/// Returns the application directory inside the platform config dir.
///
/// Creates the directory if it doesn't exist.
pub fn app_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join(APP_DIR);

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir)
}

/// Returns the path to the config file.
///
/// # Platform-specific paths
///
/// - Linux: `~/.config/counterstrafe-testkit/config.toml`
/// - macOS: `~/Library/Application Support/counterstrafe-testkit/config.toml`
/// - Windows: `%APPDATA%\counterstrafe-testkit\config.toml`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dir()?.join("config.toml"))
}

/// Path of the log file written by the binary
pub fn log_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dir()?.join("counterstrafe-testkit.log"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Pairing and filtering settings
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Record history settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// Physical keys for the four movement roles
    #[serde(default)]
    pub keys: KeyMapping,
    /// UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// History and statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Records kept per axis
    pub capacity: usize,
    /// Recent records the statistics cover
    pub stats_window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            stats_window: DEFAULT_STATS_WINDOW,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Refresh rate for UI updates (in Hz)
    pub refresh_rate_hz: u32,
    /// Color theme (dark/light)
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            theme: Theme::Dark,
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or holds
    /// out-of-range values.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use counterstrafe_testkit::Config;
    ///
    /// let config = Config::load().unwrap_or_default();
    /// println!("Threshold: {} ms", config.detector.filter_threshold_ms);
    /// ```
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Useful for testing or using custom config locations.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section against the limits the engine enforces
    pub fn validate(&self) -> Result<(), CoreError> {
        self.detector.validate()?;
        self.keys.validate()?;
        if self.history.capacity == 0 || self.history.stats_window == 0 {
            return Err(CoreError::InvalidCapacity);
        }
        Ok(())
    }

    /// Get UI refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.ui.refresh_rate_hz.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!(
            "counterstrafe-testkit-{}-{}.toml",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.detector.filter_threshold_ms, 120.0);
        assert_eq!(config.detector.debounce_window_secs, 0.05);
        assert_eq!(config.detector.arm_buffer_ms, 20.0);
        assert_eq!(config.history.capacity, 200);
        assert_eq!(config.history.stats_window, 20);
        assert_eq!(config.keys.forward.as_str(), "W");
        assert_eq!(config.keys.right.as_str(), "D");
        assert_eq!(config.ui.refresh_rate_hz, 60);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_refresh_interval() {
        let config = Config::default();
        // 60 Hz = 16666 microseconds per frame
        assert_eq!(config.refresh_interval().as_micros(), 16666);
    }

    #[test]
    fn config_refresh_interval_zero_hz_is_clamped() {
        let mut config = Config::default();
        config.ui.refresh_rate_hz = 0;
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn config_save_and_load_roundtrip() {
        let path = temp_config_path("roundtrip");

        let mut config = Config::default();
        config.detector.filter_threshold_ms = 60.0;
        config.keys = KeyMapping::new("Up", "Down", "Left", "Right");
        config.ui.theme = Theme::Light;

        config.save_to(&path).expect("Failed to save config");
        let loaded = Config::load_from(&path).expect("Failed to load config");

        assert_eq!(loaded, config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_load_missing_file_is_io_error() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn config_load_rejects_duplicate_keys() {
        let path = temp_config_path("duplicate");
        fs::write(
            &path,
            "[keys]\nforward = \"W\"\nback = \"W\"\nleft = \"A\"\nright = \"D\"\n",
        )
        .unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(CoreError::DuplicateMapping { .. }))
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");

        assert!(toml_str.contains("[detector]"));
        assert!(toml_str.contains("[history]"));
        assert!(toml_str.contains("[keys]"));
        assert!(toml_str.contains("[ui]"));
        assert!(toml_str.contains("forward = \"W\""));
        assert!(toml_str.contains("capacity = 200"));
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml_str = r#"
[detector]
debounce_window_secs = 0.1
filter_threshold_ms = 80.0
arm_buffer_ms = 10.0

[history]
capacity = 50
stats_window = 10

[keys]
forward = "i"
back = "k"
left = "j"
right = "l"

[ui]
refresh_rate_hz = 144
theme = "Light"
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");

        assert_eq!(config.detector.debounce_window_secs, 0.1);
        assert_eq!(config.detector.filter_threshold_ms, 80.0);
        assert_eq!(config.detector.arm_timeout_ms(), 90.0);
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.history.stats_window, 10);
        assert_eq!(config.keys.left.as_str(), "J");
        assert_eq!(config.ui.refresh_rate_hz, 144);
        assert_eq!(config.ui.theme, Theme::Light);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str("[ui]\nrefresh_rate_hz = 30\ntheme = \"Dark\"\n")
            .expect("Failed to deserialize");
        assert_eq!(config.detector, DetectorConfig::default());
        assert_eq!(config.keys, KeyMapping::default());
        assert_eq!(config.ui.refresh_rate_hz, 30);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.detector.filter_threshold_ms = 0.0;
        assert_eq!(config.validate(), Err(CoreError::InvalidThreshold(0.0)));

        let mut config = Config::default();
        config.history.capacity = 0;
        assert_eq!(config.validate(), Err(CoreError::InvalidCapacity));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::NoConfigDir;
        assert_eq!(err.to_string(), "Could not determine config directory");

        let io_err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));

        let invalid = ConfigError::from(CoreError::InvalidCapacity);
        assert!(invalid.to_string().starts_with("Invalid config"));
    }

    #[test]
    fn config_path_points_into_app_dir() {
        // The actual path depends on the platform
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("counterstrafe-testkit"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn theme_in_config_serialization() {
        let mut config = Config::default();
        config.ui.theme = Theme::Light;

        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");
        assert!(toml_str.contains("theme = \"Light\""));
    }
}
