/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use log::LevelFilter;
use serde_json::json;
use std::fs;

use pdf_translator::app_config::{
    complement_settings, Config, LogLevel, RuleCategoryConfig, RuleConfig, TranslationProvider, MIN_CHARS_PER_UNIT,
};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "JA");
    assert_eq!(config.chars_per_unit, 4500);
    assert!(config.output.add_target_return);
    assert!(config.output.markdown);
    assert!(config.output.output_source);
    assert!(config.output.source_as_comment);
    assert_eq!(config.output.output_dir, None);
    assert!(!config.extraction.ignore_start_condition);
    assert!(!config.extraction.ignore_end_condition);
    assert!(config.extraction.retry_relaxed);
    assert_eq!(config.translation.provider, TranslationProvider::DeepL);
    assert_eq!(config.translation.concurrent_documents, 2);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that the default rule set ships rules for every category
#[test]
fn test_default_config_rules_shouldCoverEveryCategory() {
    let rules = Config::default().rules;

    for category in [
        &rules.start_lines,
        &rules.end_lines,
        &rules.ignore_lines,
        &rules.replace_standard,
        &rules.replace_markdown,
        &rules.chart_start_lines,
        &rules.return_lines,
        &rules.return_ignore_lines,
        &rules.header_lines,
    ] {
        assert!(category.enabled_overall);
        assert!(!category.rules.is_empty());
    }
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.target_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.target_language = "en-us".to_string();
    assert!(config.validate().is_ok());

    config.chars_per_unit = MIN_CHARS_PER_UNIT - 1;
    assert!(config.validate().is_err());
    config.chars_per_unit = MIN_CHARS_PER_UNIT;
    assert!(config.validate().is_ok());

    config.translation.concurrent_documents = 0;
    assert!(config.validate().is_err());
}

/// Test that invalid rules are rejected by validation
#[test]
fn test_config_validation_withBrokenRule_shouldFail() {
    let mut config = Config::default();
    config.rules.ignore_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"(unclosed")]);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.rules.replace_standard = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"foo")]);
    let error = config.validate().unwrap_err();
    assert!(format!("{:#}", error).contains("replacement"));
}

/// Test that translator validation requires an API key
#[test]
fn test_validate_translator_withExplicitKey_shouldSucceed() {
    let mut config = Config::default();
    config.translation.api_key = "abc:fx".to_string();
    assert!(config.validate_translator().is_ok());
}

/// Test the output extension switch
#[test]
fn test_output_extension_shouldFollowMarkdownSwitch() {
    let mut config = Config::default();
    assert_eq!(config.output.extension(), "md");
    config.output.markdown = false;
    assert_eq!(config.output.extension(), "txt");
}

/// Test translator settings helpers
#[test]
fn test_translation_config_endpoint_withEmptyValue_shouldFallBackToFreeApi() {
    let mut config = Config::default();
    config.translation.endpoint = String::new();
    assert_eq!(config.translation.get_endpoint(), "https://api-free.deepl.com");

    config.translation.endpoint = "https://api.deepl.com".to_string();
    assert_eq!(config.translation.get_endpoint(), "https://api.deepl.com");
}

/// Test log level conversion
#[test]
fn test_log_level_shouldConvertToLevelFilter() {
    assert_eq!(LevelFilter::from(&LogLevel::Error), LevelFilter::Error);
    assert_eq!(LevelFilter::from(&LogLevel::Info), LevelFilter::Info);
    assert_eq!(LevelFilter::from(&LogLevel::Trace), LevelFilter::Trace);
}

/// Test provider parsing
#[test]
fn test_translation_provider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!("DeepL".parse::<TranslationProvider>().unwrap(), TranslationProvider::DeepL);
    assert!("ollama".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::DeepL.to_string(), "deepl");
}

/// Test that missing keys are filled in without touching existing values
#[test]
fn test_complement_settings_withPartialSettings_shouldFillMissingKeys() {
    let mut settings = json!({
        "target_language": "DE",
        "output": { "markdown": false },
        "rules": { "start_lines": { "rules": [] } }
    });
    let defaults = json!({
        "target_language": "JA",
        "chars_per_unit": 4500,
        "output": { "markdown": true, "output_source": true },
        "rules": { "start_lines": { "enabled_overall": true, "rules": [{ "pattern": "x" }] } }
    });

    assert!(complement_settings(&mut settings, &defaults));
    assert_eq!(settings["target_language"], "DE");
    assert_eq!(settings["chars_per_unit"], 4500);
    assert_eq!(settings["output"]["markdown"], false);
    assert_eq!(settings["output"]["output_source"], true);
    assert_eq!(settings["rules"]["start_lines"]["enabled_overall"], true);
    assert_eq!(settings["rules"]["start_lines"]["rules"], json!([]));

    // A complete document is left alone
    assert!(!complement_settings(&mut settings, &defaults));
}

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.target_language, "JA");

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.chars_per_unit, config.chars_per_unit);
    assert_eq!(reloaded.rules, config.rules);
    Ok(())
}

/// Test that a partial config file is completed and written back
#[test]
fn test_load_or_create_withPartialFile_shouldCompleteAndPersist() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", r#"{ "target_language": "DE" }"#)?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.target_language, "DE");
    assert_eq!(config.chars_per_unit, 4500);

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(written["target_language"], "DE");
    assert!(written["rules"]["header_lines"].is_object());
    Ok(())
}

/// Test that malformed JSON is reported
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
