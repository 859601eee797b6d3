/*!
 * # pdf-translator
 *
 * Translate academic PDFs through DeepL while rebuilding the paragraph
 * structure that text extraction destroys.
 *
 * ## Features
 *
 * - Extract the body of a paper between configurable start and end markers
 * - Drop page furniture and rewrite recurring artefacts with regex rules
 * - Rejoin wrapped and hyphenated lines into paragraphs
 * - Batch paragraphs into requests under a character budget
 * - Rebuild numbered headings as Markdown headings
 * - Interleave the source text with the translation, optionally as comments
 *
 * ## Architecture
 *
 * - `app_config`: Configuration loading, completion and validation
 * - `default_rules`: The rule set shipped with the default configuration
 * - `reconstruction`: Rule compilation, extraction window, segmentation,
 *   batching and output composition
 * - `extractor`: Reading lines from PDF and text inputs
 * - `translation`: Per-document translation driver and multi-document batches
 * - `providers`: Translator back ends:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::mock`: Scripted translator for tests
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Target language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod default_rules;
pub mod errors;
pub mod extractor;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod reconstruction;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions, RunSummary};
pub use errors::{AppError, ExtractionError, ProviderError, RuleError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, validate_target_language};
pub use reconstruction::{Document, Line, Paragraph, RuleSet, Segmenter, TranslationUnit};
