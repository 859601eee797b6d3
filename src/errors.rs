/*!
 * Error types for the pdf-translator application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while compiling configured rules into a rule set
#[derive(Error, Debug)]
pub enum RuleError {
    /// The pattern is not a valid regular expression
    #[error("Invalid pattern in {category} rule #{index}: {pattern} ({message})")]
    InvalidPattern {
        /// Category the rule belongs to
        category: String,
        /// Zero-based position of the rule in its category
        index: usize,
        /// The offending pattern
        pattern: String,
        /// Message from the regex compiler
        message: String,
    },

    /// The pattern relies on lookaround, which the regex engine does not support
    #[error("Unsupported lookaround in {category} rule #{index}: {pattern}")]
    UnsupportedLookaround {
        /// Category the rule belongs to
        category: String,
        /// Zero-based position of the rule in its category
        index: usize,
        /// The offending pattern
        pattern: String,
    },

    /// A field required by the category is missing from the rule
    #[error("Rule #{index} in {category} is missing required field '{field}'")]
    MissingField {
        /// Category the rule belongs to
        category: String,
        /// Zero-based position of the rule in its category
        index: usize,
        /// Name of the missing field
        field: &'static str,
    },

    /// Heading size outside of the 1..=6 Markdown range
    #[error("Rule #{index} in {category} has heading size {size}, expected 1 to 6")]
    InvalidHeadingSize {
        /// Category the rule belongs to
        category: String,
        /// Zero-based position of the rule in its category
        index: usize,
        /// The configured size
        size: u8,
    },
}

/// Errors reported by a line extractor
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The input exists but is not in a format the extractor understands
    #[error("{path} is not a supported document: {reason}")]
    UnsupportedFormat {
        /// Path of the rejected input
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// The input could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the input
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when working with translator back ends
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while translating the units of a document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the translator back end
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The translator answered with fewer lines than the unit has paragraphs
    #[error("Translator returned {actual} line(s) for unit {unit} with {expected} paragraph(s)")]
    ProtocolViolation {
        /// Zero-based index of the unit
        unit: usize,
        /// Number of paragraphs sent
        expected: usize,
        /// Number of translated lines received
        actual: usize,
    },

    /// Error while writing composed output
    #[error("Failed to compose output: {0}")]
    Compose(#[from] std::fmt::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from rule compilation
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// Error from the extractor
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from a translator back end
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Extraction produced nothing, even after relaxing the start/end conditions
    #[error("No text was extracted from {0}")]
    NoText(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
