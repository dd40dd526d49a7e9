/*!
 * Tests for application configuration
 */

use std::time::Duration;

use latinify::app_config::{Config, LogLevel, TARGET_LANGUAGE};

use crate::common::{create_temp_dir, create_test_file};

fn valid_config() -> Config {
    let mut config = Config::default();
    config.provider.api_key = "test-key".to_string();
    config
}

#[test]
fn test_default_shouldUseDocumentedLimits() {
    let config = Config::default();

    assert_eq!(config.limits.max_chars_per_page, 50_000);
    assert_eq!(config.limits.translations_per_hour, 30);
    assert_eq!(config.limits.cooldown_ms, 5_000);
    assert_eq!(config.limits.cache_ttl_ms, 86_400_000);
    assert_eq!(config.limits.batch_size, 100);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withoutApiKey_shouldFail() {
    assert!(Config::default().validate().is_err());
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = valid_config();
    config.limits.batch_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = valid_config();
    config.provider.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config, Config::default());
    assert_eq!(Config::load_or_create(&path).unwrap(), config);
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "conf.json",
        r#"{"limits": {"batch_size": 25}, "provider": {"api_key": "k"}, "log_level": "debug"}"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.limits.batch_size, 25);
    assert_eq!(config.limits.translations_per_hour, 30);
    assert_eq!(config.provider.api_key, "k");
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_translatorSettings_shouldCarryLimits() {
    let mut config = valid_config();
    config.limits.cooldown_ms = 1_500;
    config.limits.translations_per_hour = 7;

    let settings = config.translator_settings();

    assert_eq!(settings.rate_limit.cooldown, Duration::from_millis(1_500));
    assert_eq!(settings.rate_limit.hourly_limit, 7);
    assert_eq!(settings.rate_limit.window, Duration::from_secs(3_600));
    assert_eq!(settings.target_language, TARGET_LANGUAGE);
}
