use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for translator target codes
///
/// DeepL-style target codes are an ISO 639-1 code in upper case, optionally
/// followed by a regional or script variant (`JA`, `EN-US`, `ZH-HANT`).

/// Variants accepted after the base code
const VARIANTS: [(&str, &str); 8] = [
    ("EN", "GB"),
    ("EN", "US"),
    ("PT", "BR"),
    ("PT", "PT"),
    ("ZH", "HANS"),
    ("ZH", "HANT"),
    ("ES", "419"),
    ("NB", "NO"),
];

/// Split a code into its base language and optional variant, upper-cased
fn split_code(code: &str) -> (String, Option<String>) {
    let normalized = code.trim().replace('_', "-").to_uppercase();
    match normalized.split_once('-') {
        Some((base, variant)) => (base.to_string(), Some(variant.to_string())),
        None => (normalized, None),
    }
}

/// Validate a target language code and return its normalized form
pub fn validate_target_language(code: &str) -> Result<String> {
    let (base, variant) = split_code(code);

    if base.len() != 2 || Language::from_639_1(&base.to_lowercase()).is_none() {
        return Err(anyhow!("Invalid target language code: {}", code));
    }

    match variant {
        None => Ok(base),
        Some(variant) if VARIANTS.contains(&(base.as_str(), variant.as_str())) => {
            Ok(format!("{}-{}", base, variant))
        }
        Some(variant) => Err(anyhow!(
            "Unsupported variant '{}' for target language {}",
            variant,
            base
        )),
    }
}

/// Check if two target codes name the same base language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let (base1, _) = split_code(code1);
    let (base2, _) = split_code(code2);
    !base1.is_empty() && base1 == base2
}

/// Get the English language name from a target code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = validate_target_language(code)?;
    let (base, _) = split_code(&normalized);
    let lang = Language::from_639_1(&base.to_lowercase())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
