/*!
 * Extraction window.
 *
 * Selects the lines between the start and end triggers, drops ignored lines
 * and applies the replace categories. A single forward pass; the window holds
 * no state between calls, so a retry with relaxed options is a fresh call.
 */

use log::debug;

use super::classifier::HitLog;
use super::document::Line;
use super::rules::{RuleAction, RuleCategory, RuleSet};

/// Overrides for the start/end triggers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Extract from the first line on
    pub force_ignore_start: bool,
    /// Never stop at an end trigger
    pub force_ignore_end: bool,
}

impl ExtractionOptions {
    pub fn new(force_ignore_start: bool, force_ignore_end: bool) -> Self {
        Self {
            force_ignore_start,
            force_ignore_end,
        }
    }
}

/// Result of an extraction pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// At least one line survived
    Lines(Vec<Line>),
    /// Nothing survived. Usually the start/end triggers do not fit the
    /// document; the caller may retry with relaxed options.
    Empty,
}

impl ExtractionOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn into_lines(self) -> Vec<Line> {
        match self {
            Self::Lines(lines) => lines,
            Self::Empty => Vec::new(),
        }
    }
}

/// Lines plus the diagnostic hits recorded while extracting them
#[derive(Debug, Clone)]
pub struct Extraction {
    pub outcome: ExtractionOutcome,
    pub hits: HitLog,
}

/// The categories that drive extraction
#[derive(Debug, Clone)]
pub struct ExtractionWindow<'r> {
    start: &'r RuleCategory,
    end: &'r RuleCategory,
    ignore: &'r RuleCategory,
    replace: Vec<&'r RuleCategory>,
    header: Option<&'r RuleCategory>,
}

impl<'r> ExtractionWindow<'r> {
    /// Window over the categories of a rule set.
    /// Header hits are recorded here too, on the cleaned lines.
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            start: &rules.start,
            end: &rules.end,
            ignore: &rules.ignore,
            replace: rules.replace_categories().to_vec(),
            header: Some(&rules.header),
        }
    }

    /// Window over explicit categories
    pub fn from_categories(
        start: &'r RuleCategory,
        end: &'r RuleCategory,
        ignore: &'r RuleCategory,
        replace: Vec<&'r RuleCategory>,
    ) -> Self {
        Self {
            start,
            end,
            ignore,
            replace,
            header: None,
        }
    }

    /// Run the window over `lines`
    pub fn extract(&self, lines: &[Line], options: ExtractionOptions) -> Extraction {
        let mut hits = HitLog::new();
        let mut output = Vec::new();

        let start_enabled = self.start.enabled_overall;
        let end_enabled = self.end.enabled_overall;
        let mut extracting = !start_enabled || options.force_ignore_start;

        for line in lines {
            // A disabled start category counts as satisfied on every line
            if !start_enabled || hits.classify(&line.text, self.start).is_some() {
                extracting = true;
            }

            if end_enabled
                && hits.classify(&line.text, self.end).is_some()
                && !options.force_ignore_end
            {
                extracting = false;
            }

            if !extracting {
                continue;
            }

            if hits.classify(&line.text, self.ignore).is_some() {
                continue;
            }

            let text = self.apply_replacements(&line.text, &mut hits);

            if let Some(header) = self.header {
                if header.emit_diagnostics {
                    hits.classify(&text, header);
                }
            }

            output.push(line.with_text(text));
        }

        debug!("Extracted {} of {} line(s)", output.len(), lines.len());

        let outcome = if output.is_empty() {
            ExtractionOutcome::Empty
        } else {
            ExtractionOutcome::Lines(output)
        };

        Extraction { outcome, hits }
    }

    fn apply_replacements(&self, text: &str, hits: &mut HitLog) -> String {
        let mut text = text.to_string();

        for category in self.replace.iter().filter(|c| c.enabled_overall) {
            for rule in category.rules.iter().filter(|r| r.enabled) {
                let RuleAction::Replace { replacement } = &rule.action else {
                    continue;
                };
                if !rule.matcher.is_match(&text) {
                    continue;
                }
                hits.record(category, rule, &text);
                text = rule.matcher.replace_all(&text, replacement).into_owned();
            }
        }

        text
    }
}
