/*!
 * Common test utilities for the pdf-translator test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use pdf_translator::app_config::{Config, RuleCategoryConfig, RuleConfig, RuleSetConfig};

/// Route library logs to the test output; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Text of a short paper as a PDF extractor would return it: page furniture,
/// hyphenated line ends, a figure caption and a reference list
pub const SAMPLE_PAPER: &str = "Journal of Testing 12 (2024)
A Study of Line Breaks
1. Introduction
Extracted text loses its para-
graph structure because every
visual line ends in a newline.
3 of 12
Figure 1: Pipeline overview
Most work ignores this (Smith et al.
2020).
1.1. Related Work
Earlier tools join all lines.
References
[1] Smith, J. Line breaks. 2020.
";

/// Creates the sample paper as a text input
pub fn create_sample_paper(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_PAPER)
}

/// Default configuration that writes into `output_dir`
pub fn config_with_output(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.output.output_dir = Some(output_dir.to_path_buf());
    config
}

/// A small rule set with one rule per category that the pipeline uses
pub fn minimal_rules() -> RuleSetConfig {
    let mut rules = RuleSetConfig::empty();
    rules.start_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"^Introduction$")]);
    rules.end_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"^References$")]);
    rules.ignore_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"^\d+ of \d+$")]);
    rules.return_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"\.$")]);
    rules
}
