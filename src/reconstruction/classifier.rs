/*!
 * Line classification against a rule category.
 *
 * Rules are evaluated top to bottom and the first enabled rule that matches
 * wins; later rules are never evaluated.
 */

use log::debug;
use serde::Serialize;

use super::rules::{CategoryKind, Rule, RuleCategory};

/// A successful classification
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    /// The rule that matched
    pub rule: &'a Rule,
    /// Position of the rule in its category
    pub index: usize,
    /// Byte span of the match in the line
    pub span: (usize, usize),
}

/// Classify `line` against `category`.
///
/// Returns `None` when the category is disabled overall, or when no enabled
/// rule matches.
pub fn classify<'a>(line: &str, category: &'a RuleCategory) -> Option<RuleMatch<'a>> {
    if !category.enabled_overall {
        return None;
    }

    let found = category
        .rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.enabled)
        .find_map(|(index, rule)| {
            rule.matcher.find(line).map(|span| RuleMatch { rule, index, span })
        });

    if let Some(m) = &found {
        if category.emit_diagnostics {
            debug!("[{}] {}, {}", category.kind, m.rule.pattern, line);
        }
    }

    found
}

/// One recorded rule hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub category: CategoryKind,
    pub pattern: String,
    pub line: String,
}

/// Rule hits collected for categories with diagnostics enabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitLog {
    hits: Vec<RuleHit>,
}

impl HitLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hit of `rule` if its category emits diagnostics
    pub fn record(&mut self, category: &RuleCategory, rule: &Rule, line: &str) {
        if category.emit_diagnostics {
            self.hits.push(RuleHit {
                category: category.kind,
                pattern: rule.pattern.clone(),
                line: line.to_string(),
            });
        }
    }

    /// Classify and record in one step
    pub fn classify<'a>(&mut self, line: &str, category: &'a RuleCategory) -> Option<RuleMatch<'a>> {
        let found = classify(line, category);
        if let Some(m) = &found {
            self.record(category, m.rule, line);
        }
        found
    }

    pub fn extend(&mut self, other: HitLog) {
        self.hits.extend(other.hits);
    }

    pub fn hits(&self) -> &[RuleHit] {
        &self.hits
    }

    /// Hits of one category, in order
    pub fn hits_for(&self, kind: CategoryKind) -> impl Iterator<Item = &RuleHit> {
        self.hits.iter().filter(move |h| h.category == kind)
    }

    /// Hit file content for one category: `"<pattern>, <line>"` per hit
    pub fn render(&self, kind: CategoryKind) -> String {
        self.hits_for(kind)
            .map(|h| format!("{}, {}\n", h.pattern, h.line))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
