/*!
 * Tests for rule compilation, the extraction window, segmentation and
 * output composition, driven through the public API with the default rules
 */

use pdf_translator::app_config::{RuleCategoryConfig, RuleConfig, RuleSetConfig};
use pdf_translator::errors::{RuleError, TranslationError};
use crate::common;
use pdf_translator::reconstruction::{
    classify, CategoryKind, ComposeOptions, ExtractionOptions, ExtractionWindow, HeaderReconstructor, Line,
    OutputComposer, Paragraph, RuleSet, Segmenter, TranslationUnit,
};

fn default_rules() -> RuleSet {
    RuleSet::compile(&RuleSetConfig::default()).unwrap()
}

fn paragraph_texts(rules: &RuleSet, budget: usize, lines: &[&str]) -> Vec<String> {
    let lines = Line::from_texts(lines.iter().copied());
    Segmenter::new(rules, budget)
        .segment(&lines)
        .document
        .paragraphs()
        .map(|p| p.text.clone())
        .collect()
}

/// Test that lookaround patterns are rejected with a pointer to the rule
#[test]
fn test_rule_set_compile_withLookaround_shouldFail() {
    let mut config = RuleSetConfig::empty();
    config.return_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"\.$"), RuleConfig::new(r"(?<=a)b")]);

    let error = RuleSet::compile(&config).unwrap_err();
    assert!(matches!(error, RuleError::UnsupportedLookaround { index: 1, .. }));
}

/// Test that heading sizes outside 1..=6 are rejected
#[test]
fn test_rule_set_compile_withHeadingSizeSeven_shouldFail() {
    let mut config = RuleSetConfig::empty();
    config.header_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r"^\d").heading(r"\d", r"\d", 7)]);

    assert!(matches!(
        RuleSet::compile(&config),
        Err(RuleError::InvalidHeadingSize { size: 7, .. })
    ));
}

/// Test that the first enabled rule wins and disabled rules are skipped
#[test]
fn test_classify_shouldReturnFirstEnabledMatch() {
    let mut config = RuleSetConfig::empty();
    config.ignore_lines = RuleCategoryConfig::with_rules(vec![
        RuleConfig::new(r"page").disabled(),
        RuleConfig::new(r"\d+ of \d+"),
        RuleConfig::new(r"of"),
    ]);
    let rules = RuleSet::compile(&config).unwrap();

    let hit = classify("page 3 of 12", &rules.ignore).unwrap();
    assert_eq!(hit.index, 1);
    assert_eq!(hit.span, (5, 12));
    assert!(classify("nothing here", &rules.ignore).is_none());
}

/// Test that a category disabled overall never matches
#[test]
fn test_classify_withCategoryDisabled_shouldNeverMatch() {
    let mut config = RuleSetConfig::empty();
    config.ignore_lines = RuleCategoryConfig::with_rules(vec![RuleConfig::new(r".*")]);
    config.ignore_lines.enabled_overall = false;
    let rules = RuleSet::compile(&config).unwrap();

    assert!(classify("anything", &rules.ignore).is_none());
    assert_eq!(rules.category(CategoryKind::Ignore).kind, CategoryKind::Ignore);
}

/// Test the default extraction window on a typical paper layout
#[test]
fn test_extraction_window_withDefaultRules_shouldKeepBodyOnly() {
    let rules = default_rules();
    let lines = Line::from_texts([
        "Some Journal 2024",
        "1 Introduction",
        "Body text.",
        "4 of 14",
        "• a bullet",
        "References",
        "[1] A paper.",
    ]);

    let extraction = ExtractionWindow::new(&rules).extract(&lines, ExtractionOptions::default());
    let texts: Vec<String> = extraction.outcome.into_lines().into_iter().map(|l| l.text).collect();
    assert_eq!(texts, vec!["1 Introduction", "Body text.", "- a bullet"]);
}

/// Test that forcing both conditions keeps the whole document
#[test]
fn test_extraction_window_withForcedOptions_shouldKeepEverything() {
    let rules = default_rules();
    let lines = Line::from_texts(["Preface.", "References", "[1] A paper."]);

    let extraction = ExtractionWindow::new(&rules).extract(&lines, ExtractionOptions::new(true, true));
    assert_eq!(extraction.outcome.into_lines().len(), 3);
}

/// Test extraction and segmentation with one rule per category
#[test]
fn test_pipeline_withMinimalRules_shouldJoinUntilSentenceEnd() {
    let rules = RuleSet::compile(&common::minimal_rules()).unwrap();
    let lines = Line::from_texts([
        "Preamble.",
        "Introduction",
        "A line that",
        "wraps.",
        "3 of 9",
        "Next one.",
        "References",
        "[1] x.",
    ]);

    let extraction = ExtractionWindow::new(&rules).extract(&lines, ExtractionOptions::default());
    let kept = extraction.outcome.into_lines();
    assert_eq!(kept.len(), 4);
    assert_eq!(kept[0].original_index, 1);

    let document = Segmenter::new(&rules, 4500).segment(&kept).document;
    let texts: Vec<&str> = document.paragraphs().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["Introduction A line that wraps.", "Next one."]);
    assert_eq!(document.units.len(), 1);
}

/// Test hyphen joins, abbreviation vetoes and heading boundaries
#[test]
fn test_segmenter_withDefaultRules_shouldRebuildParagraphs() {
    let rules = default_rules();
    let paragraphs = paragraph_texts(
        &rules,
        4500,
        &[
            "2. Method",
            "We follow the ap-",
            "proach of Smith et al.",
            "(2020) closely.",
            "Table 2: Results",
            "per run.",
        ],
    );

    assert_eq!(
        paragraphs,
        vec![
            "2. Method",
            "We follow the approach of Smith et al. (2020) closely.",
            "Table 2: Results per run.",
        ]
    );
}

/// Test that no regular unit exceeds the budget
#[test]
fn test_segmenter_withSmallBudget_shouldRespectBudget() {
    let rules = default_rules();
    let texts: Vec<String> = (0..40).map(|i| format!("Sentence number {} is short.", i)).collect();
    let lines = Line::from_texts(texts.iter().map(String::as_str));

    let document = Segmenter::new(&rules, 120).segment(&lines).document;
    assert!(document.units.len() > 1);
    for unit in &document.units {
        assert!(!unit.is_oversized);
        assert!(unit.char_len() <= 120);
    }
    assert_eq!(document.paragraphs().count(), 40);
}

/// Test that a paragraph longer than the budget travels alone
#[test]
fn test_segmenter_withLongParagraph_shouldIsolateIt() {
    let rules = default_rules();
    let long_line = "word ".repeat(40);
    let lines = Line::from_texts(["Short one.", long_line.trim_end(), "and it ends here.", "Short two."]);

    let document = Segmenter::new(&rules, 100).segment(&lines).document;
    let oversized: Vec<&TranslationUnit> = document.units.iter().filter(|u| u.is_oversized).collect();
    assert_eq!(oversized.len(), 1);
    assert_eq!(oversized[0].paragraphs.len(), 1);
    assert!(oversized[0].paragraphs[0].is_oversized);

    let order: Vec<&str> = document.paragraphs().map(|p| p.text.as_str()).collect();
    assert_eq!(order[0], "Short one.");
    assert_eq!(order[2], "Short two.");
}

/// Test heading levels from the default header rules
#[test]
fn test_header_reconstructor_shouldCountDepth() {
    let rules = default_rules();
    let header = HeaderReconstructor::new(&rules.header);

    assert_eq!(header.detect("1. Introduction").unwrap().level, 2);
    assert_eq!(header.detect("2.1. Data").unwrap().level, 3);
    assert_eq!(header.detect("Conclusion").unwrap().level, 2);
    assert!(header.detect("This sentence is a bit too long to be a section title, surely.").is_none());
}

/// Test plain text output with the source
#[test]
fn test_composer_plainWithSource_shouldInterleave() {
    let rules = default_rules();
    let options = ComposeOptions {
        add_target_return: true,
        markdown: false,
        output_source: true,
        source_as_comment: true,
    };
    let composer = OutputComposer::new(&rules, options);
    let unit = TranslationUnit::batched(vec![Paragraph::new("1. Introduction"), Paragraph::new("Hello. World.")]);

    let mut out = String::new();
    composer
        .compose_unit(&unit, 0, &["1. はじめに".to_string(), "こんにちは。世界。".to_string()], &mut out)
        .unwrap();

    assert_eq!(
        out,
        "1. Introduction\n\n1. はじめに\n\nHello. World.\n\nこんにちは。\n世界。\n\n"
    );
}

/// Test Markdown output without the source
#[test]
fn test_composer_markdownWithoutSource_shouldKeepTargetNumbering() {
    let rules = default_rules();
    let options = ComposeOptions {
        output_source: false,
        ..ComposeOptions::default()
    };
    let composer = OutputComposer::new(&rules, options);
    let unit = TranslationUnit::batched(vec![Paragraph::new("1. Introduction")]);

    let mut out = String::new();
    composer.compose_unit(&unit, 0, &["1. はじめに".to_string()], &mut out).unwrap();
    assert_eq!(out, "## 1. はじめに\n\n");
}

/// Test that a short translator answer is a protocol violation
#[test]
fn test_composer_withMissingLines_shouldFail() {
    let rules = default_rules();
    let composer = OutputComposer::new(&rules, ComposeOptions::default());
    let unit = TranslationUnit::batched(vec![Paragraph::new("A."), Paragraph::new("B.")]);

    let mut out = String::new();
    let error = composer.compose_unit(&unit, 5, &["a".to_string()], &mut out).unwrap_err();
    assert!(matches!(
        error,
        TranslationError::ProtocolViolation { unit: 5, expected: 2, actual: 1 }
    ));
}
