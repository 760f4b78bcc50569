//! CLI configuration
//!
//! This module handles hierarchical configuration loading from multiple sources:
//! - Default configuration file
//! - Environment-specific configuration file
//! - Environment variables
//! - Command-line arguments (applied by the caller)

use config::{Config, ConfigError, Environment, File};
use ocr_artifacts_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Artifact store locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Process-wide default engine configuration
    #[serde(default)]
    pub global: Option<EngineConfig>,

    /// Preference persistence
    #[serde(default)]
    pub preferences: PreferencesConfig,

    /// Remote download settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store roots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the local store; downloads land here too
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,

    /// Root of the bundled assets
    #[serde(default = "default_bundled_root")]
    pub bundled_root: PathBuf,
}

fn default_local_root() -> PathBuf {
    PathBuf::from("data/models")
}

fn default_bundled_root() -> PathBuf {
    PathBuf::from("assets")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_root: default_local_root(),
            bundled_root: default_bundled_root(),
        }
    }
}

/// Preference file location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Path of the JSON preference file
    #[serde(default = "default_preferences_path")]
    pub path: PathBuf,
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("data/preferences.json")
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

/// Download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Whole-request timeout per file in seconds
    #[serde(default = "default_download_timeout")]
    pub timeout_seconds: u64,
}

fn default_download_timeout() -> u64 {
    300
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_download_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting
    #[serde(default)]
    pub json_format: bool,

    /// Include target module
    #[serde(default)]
    pub include_target: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            include_target: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from files and environment
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default configuration file (config/default.toml)
    /// 2. Environment-specific file (config/{env}.toml)
    /// 3. Environment variables (OCR_ARTIFACTS__*)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed
    pub fn load(config_dir: impl Into<PathBuf>, environment: &str) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        let config = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", environment))).required(false))
            // e.g., OCR_ARTIFACTS__GLOBAL__LOAD_STRATEGY=file_only
            .add_source(
                Environment::with_prefix("OCR_ARTIFACTS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration with defaults if files don't exist or don't parse
    pub fn load_or_default(config_dir: impl Into<PathBuf>, environment: &str) -> Self {
        Self::load(config_dir, environment).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load configuration: {}", e);
            eprintln!("Using default configuration");
            Self::default()
        })
    }
}

/// Get the current environment name
///
/// Reads from the `ENVIRONMENT` or `ENV` environment variable,
/// defaulting to "development" if not set.
pub fn get_environment() -> String {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("ENV"))
        .unwrap_or_else(|_| "development".to_string())
}
