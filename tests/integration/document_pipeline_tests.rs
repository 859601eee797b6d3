/*!
 * Integration tests for the document pipeline: extraction window,
 * segmentation, translation and composition working together.
 */

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use pdf_translator::app_config::Config;
use pdf_translator::app_controller::Controller;
use pdf_translator::errors::TranslationError;
use pdf_translator::extractor::lines_from_text;
use pdf_translator::providers::mock::MockTranslator;
use pdf_translator::reconstruction::{ComposeOptions, OutputComposer};
use pdf_translator::translation::{CancellationFlag, DocumentTranslator};
use crate::common;

/// Translation stand-in that ends every line with a Japanese full stop
fn full_stop(line: &str) -> String {
    format!("{}。", line.trim_end_matches('.'))
}

/// Test the composed Markdown output of the sample paper
#[tokio::test]
async fn test_pipeline_withSamplePaper_shouldComposeMarkdown() -> Result<()> {
    common::init_logging();
    let controller = Controller::with_config(Config::default())?;
    let prepared = controller.prepare_lines(Path::new("sample.pdf"), &lines_from_text(common::SAMPLE_PAPER))?;

    let mock = Arc::new(MockTranslator::working().with_custom_line(full_stop));
    let composer = OutputComposer::new(controller.rules(), ComposeOptions::from(&controller.config().output));
    let translator = DocumentTranslator::new(mock.clone(), composer, "JA", CancellationFlag::new());

    let translated = translator.translate_document("sample.pdf", &prepared.document, &|_, _| {}).await?;

    let expected = concat!(
        "## 1. Introduction\nIntroduction。  \n\n",
        "%%Extracted text loses its paragraph structure because every visual line ends in a newline.%%\n\n",
        "Extracted text loses its paragraph structure because every visual line ends in a newline。  \n\n",
        "%%Figure 1: Pipeline overview.%%\n\n",
        "Figure 1: Pipeline overview。  \n\n",
        "%%Most work ignores this (Smith et al. 2020).%%\n\n",
        "Most work ignores this (Smith et al. 2020)。  \n\n",
        "### 1.1. Related Work\nRelated Work。  \n\n",
        "%%Earlier tools join all lines.%%\n\n",
        "Earlier tools join all lines。  \n\n",
    );
    assert_eq!(translated.text, expected);
    assert_eq!(mock.request_count(), 1);
    assert_eq!(translated.report.units_translated, 1);
    Ok(())
}

/// Test that the translator receives one paragraph per line
#[tokio::test]
async fn test_pipeline_requests_shouldJoinParagraphsWithNewlines() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    let prepared = controller.prepare_lines(Path::new("sample.pdf"), &lines_from_text(common::SAMPLE_PAPER))?;

    let mock = Arc::new(MockTranslator::working());
    let composer = OutputComposer::new(controller.rules(), ComposeOptions::default());
    let translator = DocumentTranslator::new(mock.clone(), composer, "JA", CancellationFlag::new());
    translator.translate_document("sample.pdf", &prepared.document, &|_, _| {}).await?;

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].lines().count(), 6);
    assert!(requests[0].starts_with("1. Introduction\nExtracted text"));
    Ok(())
}

/// Test plain output without the source text
#[tokio::test]
async fn test_pipeline_plainTranslationOnly_shouldSkipHeadingsAndSource() -> Result<()> {
    let mut config = Config::default();
    config.output.markdown = false;
    config.output.output_source = false;
    config.output.add_target_return = false;
    let controller = Controller::with_config(config)?;
    let prepared = controller.prepare_lines(Path::new("sample.pdf"), &lines_from_text(common::SAMPLE_PAPER))?;

    let mock = Arc::new(MockTranslator::working().with_custom_line(full_stop));
    let composer = OutputComposer::new(controller.rules(), ComposeOptions::from(&controller.config().output));
    let translator = DocumentTranslator::new(mock, composer, "JA", CancellationFlag::new());
    let translated = translator.translate_document("sample.pdf", &prepared.document, &|_, _| {}).await?;

    assert!(translated.text.starts_with("1. Introduction。\n\nExtracted text"));
    assert!(!translated.text.contains('#'));
    assert!(!translated.text.contains("%%"));
    Ok(())
}

/// Test that small budgets split the document and keep paragraph order
#[tokio::test]
async fn test_pipeline_withSmallBudget_shouldSendSeveralUnitsInOrder() -> Result<()> {
    let mut config = Config::default();
    config.chars_per_unit = 100;
    let controller = Controller::with_config(config)?;
    let prepared = controller.prepare_lines(Path::new("sample.pdf"), &lines_from_text(common::SAMPLE_PAPER))?;
    assert!(prepared.document.units.len() > 1);

    let mock = Arc::new(MockTranslator::working());
    let composer = OutputComposer::new(controller.rules(), ComposeOptions::default());
    let translator = DocumentTranslator::new(mock.clone(), composer, "JA", CancellationFlag::new());

    let progress = parking_lot::Mutex::new(Vec::new());
    let translated = translator
        .translate_document("sample.pdf", &prepared.document, &|done, total| progress.lock().push((done, total)))
        .await?;

    let units = prepared.document.units.len();
    assert_eq!(mock.request_count(), units);
    assert_eq!(progress.lock().last().copied(), Some((units, units)));

    let first = translated.text.find("[JA] Extracted").unwrap();
    let last = translated.text.find("[JA] Earlier tools").unwrap();
    assert!(first < last);
    Ok(())
}

/// Test that a short translator answer aborts the document
#[tokio::test]
async fn test_pipeline_withShortAnswer_shouldReportProtocolViolation() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    let prepared = controller.prepare_lines(Path::new("sample.pdf"), &lines_from_text(common::SAMPLE_PAPER))?;

    let composer = OutputComposer::new(controller.rules(), ComposeOptions::default());
    let translator = DocumentTranslator::new(Arc::new(MockTranslator::short()), composer, "JA", CancellationFlag::new());
    let result = translator.translate_document("sample.pdf", &prepared.document, &|_, _| {}).await;

    assert!(matches!(
        result,
        Err(TranslationError::ProtocolViolation { unit: 0, expected: 6, actual: 5 })
    ));
    Ok(())
}
