use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::default::Default;
use std::fs;
use std::path::{Path, PathBuf};

use crate::default_rules;
use crate::reconstruction::RuleSet;

/// Application configuration module
/// This module handles the application configuration including loading,
/// completing, validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (DeepL style, e.g. "JA", "EN-GB")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Character budget of one translation unit
    #[serde(default = "default_chars_per_unit")]
    pub chars_per_unit: usize,

    /// Output composition settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Extraction window settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Translator settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Line classification rules
    #[serde(default)]
    pub rules: RuleSetConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Output composition settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Break translated text after every sentence
    #[serde(default = "default_true")]
    pub add_target_return: bool,

    /// Write Markdown instead of plain text
    #[serde(default = "default_true")]
    pub markdown: bool,

    /// Interleave the source text with the translation
    #[serde(default = "default_true")]
    pub output_source: bool,

    /// In Markdown, wrap source paragraphs in %% comment markers
    #[serde(default = "default_true")]
    pub source_as_comment: bool,

    /// Output directory; the input file's directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            add_target_return: true,
            markdown: true,
            output_source: true,
            source_as_comment: true,
            output_dir: None,
        }
    }
}

impl OutputConfig {
    /// File extension matching the output mode
    pub fn extension(&self) -> &'static str {
        if self.markdown { "md" } else { "txt" }
    }
}

/// Extraction window settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Start extracting from the first line regardless of the start rules
    #[serde(default)]
    pub ignore_start_condition: bool,

    /// Never stop extracting because of the end rules
    #[serde(default)]
    pub ignore_end_condition: bool,

    /// Retry with relaxed start/end conditions when nothing is extracted
    #[serde(default = "default_true")]
    pub retry_relaxed: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ignore_start_condition: false,
            ignore_end_condition: false,
            retry_relaxed: true,
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL API
    #[default]
    DeepL,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepL => "deepl".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translator settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_deepl_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Documents processed at the same time
    #[serde(default = "default_concurrent_documents")]
    pub concurrent_documents: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            api_key: String::new(),
            endpoint: default_deepl_endpoint(),
            timeout_secs: default_timeout_secs(),
            concurrent_documents: default_concurrent_documents(),
        }
    }
}

impl TranslationConfig {
    /// Get the API key, falling back to the DEEPL_API_KEY environment variable
    pub fn get_api_key(&self) -> String {
        self.api_key_or(std::env::var("DEEPL_API_KEY").ok())
    }

    /// The configured key, or `fallback` when none is configured
    pub fn api_key_or(&self, fallback: Option<String>) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        fallback.unwrap_or_default()
    }

    /// Get the endpoint, defaulting to the free API when unset
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.is_empty() {
            default_deepl_endpoint()
        } else {
            self.endpoint.clone()
        }
    }
}

/// One configured rule.
///
/// `replacement` is required in the replace categories; `depth_count`,
/// `target_remove` and `max_heading_size` in the header category.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RuleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub ignore_case: bool,

    pub pattern: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_count: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_remove: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heading_size: Option<u8>,

    /// Sample text the pattern is meant to match
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub example: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remarks: String,
}

impl RuleConfig {
    /// An enabled, case-sensitive match rule
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            enabled: true,
            ignore_case: false,
            pattern: pattern.into(),
            replacement: None,
            depth_count: None,
            target_remove: None,
            max_heading_size: None,
            example: String::new(),
            remarks: String::new(),
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    pub fn heading(
        mut self,
        depth_count: impl Into<String>,
        target_remove: impl Into<String>,
        max_heading_size: u8,
    ) -> Self {
        self.depth_count = Some(depth_count.into());
        self.target_remove = Some(target_remove.into());
        self.max_heading_size = Some(max_heading_size);
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }
}

/// One configured rule category
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RuleCategoryConfig {
    #[serde(default = "default_true")]
    pub enabled_overall: bool,

    /// Record every hit of this category in a `<stem>_<Category>.txt` file
    #[serde(default)]
    pub output_hit_lines: bool,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for RuleCategoryConfig {
    fn default() -> Self {
        Self {
            enabled_overall: true,
            output_hit_lines: false,
            rules: Vec::new(),
        }
    }
}

impl RuleCategoryConfig {
    /// Enabled category holding the given rules
    pub fn with_rules(rules: Vec<RuleConfig>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }
}

/// The full configured rule set
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RuleSetConfig {
    pub start_lines: RuleCategoryConfig,
    pub end_lines: RuleCategoryConfig,
    pub ignore_lines: RuleCategoryConfig,
    pub replace_standard: RuleCategoryConfig,
    pub replace_markdown: RuleCategoryConfig,
    pub chart_start_lines: RuleCategoryConfig,
    pub return_lines: RuleCategoryConfig,
    pub return_ignore_lines: RuleCategoryConfig,
    pub header_lines: RuleCategoryConfig,
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        default_rules::default_rule_set()
    }
}

impl RuleSetConfig {
    /// Every category enabled but empty
    pub fn empty() -> Self {
        Self {
            start_lines: RuleCategoryConfig::default(),
            end_lines: RuleCategoryConfig::default(),
            ignore_lines: RuleCategoryConfig::default(),
            replace_standard: RuleCategoryConfig::default(),
            replace_markdown: RuleCategoryConfig::default(),
            chart_start_lines: RuleCategoryConfig::default(),
            return_lines: RuleCategoryConfig::default(),
            return_ignore_lines: RuleCategoryConfig::default(),
            header_lines: RuleCategoryConfig::default(),
        }
    }

    /// Turn on hit recording for every category
    pub fn record_all_hits(&mut self) {
        for category in [
            &mut self.start_lines,
            &mut self.end_lines,
            &mut self.ignore_lines,
            &mut self.replace_standard,
            &mut self.replace_markdown,
            &mut self.chart_start_lines,
            &mut self.return_lines,
            &mut self.return_ignore_lines,
            &mut self.header_lines,
        ] {
            category.output_hit_lines = true;
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Smallest accepted unit budget
pub const MIN_CHARS_PER_UNIT: usize = 100;

fn default_target_language() -> String {
    "JA".to_string()
}

fn default_chars_per_unit() -> usize {
    4500
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_concurrent_documents() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_deepl_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

impl Config {
    /// Load the configuration from `path`.
    ///
    /// A missing file is created with the defaults. Keys missing from an
    /// existing file are filled in from the defaults and the completed file
    /// is written back, so settings added by newer versions show up for
    /// editing.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let mut value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let defaults = serde_json::to_value(Config::default())
            .context("Failed to serialize default config")?;

        let completed = complement_settings(&mut value, &defaults);

        let config: Config = serde_json::from_value(value.clone())
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        if completed {
            info!("Config file '{}' was missing settings, writing completed version.", path.display());
            let json = serde_json::to_string_pretty(&value)
                .context("Failed to serialize completed config to JSON")?;
            fs::write(path, json)
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        }

        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_target_language(&self.target_language)?;

        if self.chars_per_unit < MIN_CHARS_PER_UNIT {
            return Err(anyhow!(
                "chars_per_unit must be at least {}, got {}",
                MIN_CHARS_PER_UNIT,
                self.chars_per_unit
            ));
        }

        if self.translation.concurrent_documents == 0 {
            return Err(anyhow!("concurrent_documents must be at least 1"));
        }

        RuleSet::compile(&self.rules).context("Invalid rule configuration")?;

        Ok(())
    }

    /// Validate the settings needed to actually call the translator
    pub fn validate_translator(&self) -> Result<()> {
        match self.translation.provider {
            TranslationProvider::DeepL => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!(
                        "Translation API key is required for {} (set translation.api_key or DEEPL_API_KEY)",
                        self.translation.provider.display_name()
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            chars_per_unit: default_chars_per_unit(),
            output: OutputConfig::default(),
            extraction: ExtractionConfig::default(),
            translation: TranslationConfig::default(),
            rules: RuleSetConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Fill keys missing from `settings` with the values from `defaults`,
/// recursing into nested objects. Existing values, arrays included, are kept.
/// Returns whether anything was added.
pub fn complement_settings(settings: &mut Value, defaults: &Value) -> bool {
    let (Value::Object(current), Value::Object(default_map)) = (&mut *settings, defaults) else {
        return false;
    };

    let mut completed = false;
    for (key, default_value) in default_map {
        match current.get_mut(key) {
            Some(existing) => {
                if default_value.is_object() {
                    if !existing.is_object() {
                        *existing = Value::Object(serde_json::Map::new());
                        completed = true;
                    }
                    completed |= complement_settings(existing, default_value);
                }
            }
            None => {
                current.insert(key.clone(), default_value.clone());
                completed = true;
            }
        }
    }

    completed
}
