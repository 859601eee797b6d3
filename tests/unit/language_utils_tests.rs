/*!
 * Tests for language code utilities
 */

use pdf_translator::language_utils::{get_language_name, language_codes_match, validate_target_language};

/// Test normalisation of valid codes
#[test]
fn test_validate_target_language_withValidCodes_shouldNormalize() {
    assert_eq!(validate_target_language("ja").unwrap(), "JA");
    assert_eq!(validate_target_language(" DE ").unwrap(), "DE");
    assert_eq!(validate_target_language("en-us").unwrap(), "EN-US");
    assert_eq!(validate_target_language("pt_br").unwrap(), "PT-BR");
    assert_eq!(validate_target_language("zh-hant").unwrap(), "ZH-HANT");
}

/// Test rejection of invalid codes and variants
#[test]
fn test_validate_target_language_withInvalidCodes_shouldFail() {
    assert!(validate_target_language("").is_err());
    assert!(validate_target_language("xx").is_err());
    assert!(validate_target_language("jpn").is_err());
    assert!(validate_target_language("DE-AT").is_err());
}

/// Test base language comparison
#[test]
fn test_language_codes_match_shouldCompareBaseLanguage() {
    assert!(language_codes_match("EN-GB", "en-us"));
    assert!(language_codes_match("ja", "JA"));
    assert!(!language_codes_match("DE", "FR"));
    assert!(!language_codes_match("", ""));
}

/// Test English names
#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("JA").unwrap(), "Japanese");
    assert_eq!(get_language_name("de").unwrap(), "German");
    assert_eq!(get_language_name("EN-US").unwrap(), "English");
    assert!(get_language_name("xx").is_err());
}
