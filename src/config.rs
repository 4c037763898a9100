use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::email::EmailConfig;
use crate::remote::FirebaseConfig;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the local SQLite store
    pub database_path: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Remote store settings; incomplete settings mean local-only mode
    pub firebase: FirebaseConfig,
    /// Notification email settings; no API key means notifications are off
    pub email: EmailConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    firebase: Option<FirebaseConfig>,
    email: Option<EmailConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |name| std::env::var(name).ok())
    }

    /// Like [`Config::load`], reading variables through `env`.
    pub fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Empty variables count as unset
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("local.db"),
            ConfigSource::Default,
        );
        let mut config_file = None;
        let mut firebase = FirebaseConfig::default();
        let mut email = EmailConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
                database_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(file_firebase) = file_config.firebase {
                firebase = file_firebase;
            }
            if let Some(file_email) = file_config.email {
                email = file_email;
            }
        }

        if let Some(db_path) = env("ZENTRA_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }

        // Firebase env var overrides
        if let Some(key) = env("ZENTRA_FIREBASE_API_KEY") {
            firebase.api_key = Some(key);
        }
        if let Some(domain) = env("ZENTRA_FIREBASE_AUTH_DOMAIN") {
            firebase.auth_domain = Some(domain);
        }
        if let Some(project) = env("ZENTRA_FIREBASE_PROJECT_ID") {
            firebase.project_id = Some(project);
        }
        if let Some(bucket) = env("ZENTRA_FIREBASE_STORAGE_BUCKET") {
            firebase.storage_bucket = Some(bucket);
        }

        // Email env var overrides
        if let Some(key) = env("ZENTRA_RESEND_API_KEY") {
            email.api_key = Some(key);
        }
        if let Some(from) = env("ZENTRA_RESEND_FROM_EMAIL") {
            email.from_email = from;
        }
        if let Some(to) = env("ZENTRA_RESEND_TO_EMAIL") {
            email.to_email = to;
        }

        Ok(Self {
            database_path,
            config_file,
            firebase,
            email,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/zentra/
    /// - macOS: ~/Library/Application Support/zentra/
    /// - Windows: %APPDATA%/zentra/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zentra")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/zentra/
    /// - macOS: ~/Library/Application Support/zentra/
    /// - Windows: %APPDATA%/zentra/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zentra")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
