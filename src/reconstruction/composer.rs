/*!
 * Output composition.
 *
 * Turns a unit's original paragraphs and the translator's lines back into
 * plain text or Markdown: sentence re-wrapping, heading reconstruction and
 * optional interleaving of the source text.
 */

use std::fmt::Write;

use log::warn;

use super::classifier::classify;
use super::document::TranslationUnit;
use super::rules::{Matcher, RuleAction, RuleCategory, RuleSet};
use crate::app_config::OutputConfig;
use crate::errors::TranslationError;

const MARKDOWN_HARD_BREAK: &str = "  \n";

/// Output-mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    pub add_target_return: bool,
    pub markdown: bool,
    pub output_source: bool,
    pub source_as_comment: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for ComposeOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            add_target_return: config.add_target_return,
            markdown: config.markdown,
            output_source: config.output_source,
            source_as_comment: config.source_as_comment,
        }
    }
}

/// A heading recognised in an original paragraph
#[derive(Debug, Clone, Copy)]
pub struct Heading<'r> {
    /// Number of `#` characters, 1 to 6
    pub level: usize,
    /// Removes the numbering from the translated heading
    pub target_remove: &'r Matcher,
}

impl Heading<'_> {
    pub fn prefix(&self) -> String {
        "#".repeat(self.level)
    }
}

/// Recognises headings with the header category
#[derive(Debug, Clone, Copy)]
pub struct HeaderReconstructor<'r> {
    category: &'r RuleCategory,
}

impl<'r> HeaderReconstructor<'r> {
    pub fn new(category: &'r RuleCategory) -> Self {
        Self { category }
    }

    /// Heading for `original`, if the first matching header rule says so.
    /// Depth is the number of depth-count matches, at least 1.
    pub fn detect(&self, original: &str) -> Option<Heading<'r>> {
        let found = classify(original, self.category)?;

        let RuleAction::Heading {
            depth_count,
            target_remove,
            max_heading_size,
        } = &found.rule.action
        else {
            return None;
        };

        let depth = depth_count.count(original).max(1);
        let level = (usize::from(*max_heading_size) + depth - 1).min(6);

        Some(Heading { level, target_remove })
    }
}

/// Writes composed units into a text buffer
#[derive(Debug, Clone)]
pub struct OutputComposer<'r> {
    header: HeaderReconstructor<'r>,
    options: ComposeOptions,
}

impl<'r> OutputComposer<'r> {
    pub fn new(rules: &'r RuleSet, options: ComposeOptions) -> Self {
        Self {
            header: HeaderReconstructor::new(&rules.header),
            options,
        }
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Normalise `．` to `。` and, when enabled, break after every sentence
    pub fn rewrap(&self, translated: &str) -> String {
        let sentence_end = if !self.options.add_target_return {
            "。"
        } else if self.options.markdown {
            "。  \n"
        } else {
            "。\n"
        };

        let mut out = String::with_capacity(translated.len());
        for c in translated.chars() {
            match c {
                '。' | '．' => out.push_str(sentence_end),
                _ => out.push(c),
            }
        }
        out
    }

    /// Compose one translated unit.
    ///
    /// Fails when the translator returned fewer lines than the unit has
    /// paragraphs; surplus lines are dropped with a warning.
    pub fn compose_unit(
        &self,
        unit: &TranslationUnit,
        unit_index: usize,
        translated: &[String],
        out: &mut String,
    ) -> Result<(), TranslationError> {
        let expected = unit.paragraphs.len();
        if translated.len() < expected {
            return Err(TranslationError::ProtocolViolation {
                unit: unit_index,
                expected,
                actual: translated.len(),
            });
        }
        if translated.len() > expected {
            warn!(
                "Unit {}: translator returned {} line(s) for {} paragraph(s), ignoring the rest",
                unit_index,
                translated.len(),
                expected
            );
        }

        if unit.is_oversized {
            self.write_manual_notice(out)?;
        }

        for (paragraph, line) in unit.paragraphs.iter().zip(translated) {
            let target = self.rewrap(line);
            self.write_paragraph(&paragraph.text, &target, out)?;
        }

        Ok(())
    }

    /// Compose a unit that was not translated: the notice, then the source
    pub fn compose_untranslated(&self, unit: &TranslationUnit, out: &mut String) -> Result<(), TranslationError> {
        self.write_manual_notice(out)?;
        for paragraph in &unit.paragraphs {
            write!(out, "{}\n\n", paragraph.text)?;
        }
        Ok(())
    }

    fn write_manual_notice(&self, out: &mut String) -> Result<(), TranslationError> {
        if self.options.markdown {
            write!(
                out,
                "> [!WARNING]\n> Manual translation required: this paragraph is longer than one translation request allows.\n\n"
            )?;
        } else {
            write!(
                out,
                "[Manual translation required: this paragraph is longer than one translation request allows]\n\n"
            )?;
        }
        Ok(())
    }

    fn write_paragraph(&self, original: &str, target: &str, out: &mut String) -> Result<(), TranslationError> {
        let options = &self.options;

        if options.markdown {
            if let Some(heading) = self.header.detect(original) {
                write!(out, "{} ", heading.prefix())?;

                let mut target = target;
                if options.output_source {
                    writeln!(out, "{}", original)?;
                    target = heading.target_remove.strip_leading(target);
                }

                if !target.is_empty() {
                    write!(out, "{}{}", target, paragraph_break(target))?;
                } else {
                    out.push('\n');
                }
                return Ok(());
            }
        }

        if options.output_source {
            if options.markdown && options.source_as_comment {
                write!(out, "%%{}%%\n\n", original)?;
            } else {
                write!(out, "{}\n\n", original)?;
            }
        }

        write!(out, "{}{}", target, paragraph_break(target))?;
        Ok(())
    }
}

/// A blank line after the paragraph, or one newline when the text already
/// ends with a line break
fn paragraph_break(text: &str) -> &'static str {
    if text.ends_with('\n') { "\n" } else { "\n\n" }
}
