use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::google::DEFAULT_ENDPOINT;
use crate::translation::{RateLimitPolicy, TranslatorSettings};

/// The one language every page is translated into
pub const TARGET_LANGUAGE: &str = "la";

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Per-page and per-hour limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Translation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Persistent store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Limits applied to every translation pass
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LimitsConfig {
    // @field: Character budget per page
    #[serde(default = "default_max_chars_per_page")]
    pub max_chars_per_page: usize,

    // @field: Successful passes allowed per hour
    #[serde(default = "default_translations_per_hour")]
    pub translations_per_hour: u32,

    // @field: Minimum gap between successful passes
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    // @field: Cache entry time-to-live
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    // @field: Texts per provider call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_chars_per_page: default_max_chars_per_page(),
            translations_per_hour: default_translations_per_hour(),
            cooldown_ms: default_cooldown_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
            batch_size: default_batch_size(),
        }
    }
}

/// Provider configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct StorageConfig {
    // @field: Database file; the user data directory when absent
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_chars_per_page() -> usize {
    50_000
}

fn default_translations_per_hour() -> u32 {
    30
}

fn default_cooldown_ms() -> u64 {
    5_000
}

fn default_cache_ttl_ms() -> u64 {
    24 * 60 * 60 * 1000
}

fn default_batch_size() -> usize {
    100
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!(
            "Config file not found at '{}', creating default config.",
            path.display()
        );
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json).with_context(|| {
            format!("Failed to write default config to file: {}", path.display())
        })?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.max_chars_per_page == 0 {
            return Err(anyhow!("max_chars_per_page must be greater than zero"));
        }
        if limits.translations_per_hour == 0 {
            return Err(anyhow!("translations_per_hour must be greater than zero"));
        }
        if limits.cache_ttl_ms == 0 {
            return Err(anyhow!("cache_ttl_ms must be greater than zero"));
        }
        if limits.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than zero"));
        }

        url::Url::parse(&self.provider.endpoint)
            .with_context(|| format!("Invalid provider endpoint: {}", self.provider.endpoint))?;

        if self.provider.api_key.trim().is_empty() {
            return Err(anyhow!("Translation API key is required"));
        }

        Ok(())
    }

    /// Settings for the translation core
    pub fn translator_settings(&self) -> TranslatorSettings {
        TranslatorSettings {
            max_chars: self.limits.max_chars_per_page,
            rate_limit: RateLimitPolicy {
                hourly_limit: self.limits.translations_per_hour,
                cooldown: Duration::from_millis(self.limits.cooldown_ms),
                ..RateLimitPolicy::default()
            },
            cache_ttl: Duration::from_millis(self.limits.cache_ttl_ms),
            batch_size: self.limits.batch_size,
            target_language: TARGET_LANGUAGE.to_string(),
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            limits: LimitsConfig::default(),
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
