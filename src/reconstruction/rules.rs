/*!
 * Compiled classification rules.
 *
 * A `RuleSet` is the immutable, compiled form of the `rules` section of the
 * configuration. Each category keeps its rules in configuration order and
 * keeps disabled rules in place, so evaluation order never depends on which
 * toggles happen to be set.
 */

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

use crate::app_config::{RuleCategoryConfig, RuleConfig, RuleSetConfig};
use crate::errors::RuleError;

/// The unterminated-bracket rule shipped with the default rule set.
/// It needs a negative lookahead, so it gets a dedicated matcher.
pub const UNTERMINATED_BRACKET_PATTERN: &str = r"\[(?!.*\]).*$";

const LOOKAROUND_OPENERS: [&str; 4] = ["(?=", "(?!", "(?<=", "(?<!"];

/// Rule categories, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CategoryKind {
    Start,
    End,
    Ignore,
    ReplaceStandard,
    ReplaceMarkdown,
    ChartStart,
    Return,
    ReturnIgnore,
    Header,
}

impl CategoryKind {
    /// All categories in pipeline order
    pub const ALL: [CategoryKind; 9] = [
        CategoryKind::Start,
        CategoryKind::End,
        CategoryKind::Ignore,
        CategoryKind::ReplaceStandard,
        CategoryKind::ReplaceMarkdown,
        CategoryKind::ChartStart,
        CategoryKind::Return,
        CategoryKind::ReturnIgnore,
        CategoryKind::Header,
    ];

    /// Key of the category in the configuration file
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Start => "start_lines",
            Self::End => "end_lines",
            Self::Ignore => "ignore_lines",
            Self::ReplaceStandard => "replace_standard",
            Self::ReplaceMarkdown => "replace_markdown",
            Self::ChartStart => "chart_start_lines",
            Self::Return => "return_lines",
            Self::ReturnIgnore => "return_ignore_lines",
            Self::Header => "header_lines",
        }
    }

    /// Suffix used for the per-category hit file (`<stem>_<suffix>.txt`)
    pub fn hit_file_suffix(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::End => "End",
            Self::Ignore => "Ignore",
            Self::ReplaceStandard => "Replace",
            Self::ReplaceMarkdown => "MarkdownReplace",
            Self::ChartStart => "Chart",
            Self::Return => "Return",
            Self::ReturnIgnore => "ReturnIgnore",
            Self::Header => "Header",
        }
    }

    /// Start and end categories gate extraction: when disabled overall they are
    /// treated as always satisfied (start) or never triggered (end).
    pub fn is_gating(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }

    fn is_replace(&self) -> bool {
        matches!(self, Self::ReplaceStandard | Self::ReplaceMarkdown)
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config_key())
    }
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Plain regular expression
    Regex(Regex),
    /// First `[` that is not closed by a later `]`, through end of line
    UnterminatedBracket,
}

impl Matcher {
    fn compile(
        pattern: &str,
        ignore_case: bool,
        category: CategoryKind,
        index: usize,
    ) -> Result<Self, RuleError> {
        if pattern.trim() == UNTERMINATED_BRACKET_PATTERN {
            return Ok(Self::UnterminatedBracket);
        }

        if LOOKAROUND_OPENERS.iter().any(|opener| pattern.contains(opener)) {
            return Err(RuleError::UnsupportedLookaround {
                category: category.to_string(),
                index,
                pattern: pattern.to_string(),
            });
        }

        RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map(Self::Regex)
            .map_err(|e| RuleError::InvalidPattern {
                category: category.to_string(),
                index,
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Byte span of the leftmost match
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Self::Regex(re) => re.find(text).map(|m| (m.start(), m.end())),
            Self::UnterminatedBracket => {
                let tail = text.rfind(']').map_or(0, |pos| pos + 1);
                text[tail..].find('[').map(|pos| (tail + pos, text.len()))
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// Number of non-overlapping matches
    pub fn count(&self, text: &str) -> usize {
        match self {
            Self::Regex(re) => re.find_iter(text).count(),
            Self::UnterminatedBracket => usize::from(self.is_match(text)),
        }
    }

    /// Substitute every match with `replacement`
    pub fn replace_all<'t>(&self, text: &'t str, replacement: &str) -> Cow<'t, str> {
        match self {
            Self::Regex(re) => re.replace_all(text, replacement),
            Self::UnterminatedBracket => match self.find(text) {
                Some((start, end)) => {
                    Cow::Owned(format!("{}{}{}", &text[..start], replacement, &text[end..]))
                }
                None => Cow::Borrowed(text),
            },
        }
    }

    /// Remove consecutive matches anchored at the start of `text`
    pub fn strip_leading<'t>(&self, text: &'t str) -> &'t str {
        let mut rest = text;
        while let Some((0, end)) = self.find(rest) {
            if end == 0 {
                break;
            }
            rest = &rest[end..];
        }
        rest
    }
}

/// What a rule does once it matches
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Plain classification
    Match,
    /// Substitute matches with the given text (regex replacement syntax)
    Replace { replacement: String },
    /// Markdown heading detection
    Heading {
        depth_count: Matcher,
        target_remove: Matcher,
        max_heading_size: u8,
    },
}

/// A single compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub enabled: bool,
    pub ignore_case: bool,
    pub pattern: String,
    pub matcher: Matcher,
    pub action: RuleAction,
}

impl Rule {
    fn compile(config: &RuleConfig, category: CategoryKind, index: usize) -> Result<Self, RuleError> {
        let matcher = Matcher::compile(&config.pattern, config.ignore_case, category, index)?;

        let missing = |field: &'static str| RuleError::MissingField {
            category: category.to_string(),
            index,
            field,
        };

        let action = if category.is_replace() {
            let replacement = config.replacement.as_deref().ok_or_else(|| missing("replacement"))?;
            RuleAction::Replace {
                replacement: python_style_replacement(replacement),
            }
        } else if category == CategoryKind::Header {
            let depth_count = config.depth_count.as_deref().ok_or_else(|| missing("depth_count"))?;
            let target_remove = config.target_remove.as_deref().ok_or_else(|| missing("target_remove"))?;
            let max_heading_size = config.max_heading_size.unwrap_or(2);
            if !(1..=6).contains(&max_heading_size) {
                return Err(RuleError::InvalidHeadingSize {
                    category: category.to_string(),
                    index,
                    size: max_heading_size,
                });
            }
            RuleAction::Heading {
                depth_count: Matcher::compile(depth_count, config.ignore_case, category, index)?,
                target_remove: Matcher::compile(target_remove, config.ignore_case, category, index)?,
                max_heading_size,
            }
        } else {
            RuleAction::Match
        };

        Ok(Self {
            enabled: config.enabled,
            ignore_case: config.ignore_case,
            pattern: config.pattern.clone(),
            matcher,
            action,
        })
    }
}

/// An ordered category of rules
#[derive(Debug, Clone)]
pub struct RuleCategory {
    pub kind: CategoryKind,
    pub enabled_overall: bool,
    pub emit_diagnostics: bool,
    pub rules: Vec<Rule>,
}

impl RuleCategory {
    /// Compile a category from its configuration
    pub fn compile(kind: CategoryKind, config: &RuleCategoryConfig) -> Result<Self, RuleError> {
        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| Rule::compile(rule, kind, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            enabled_overall: config.enabled_overall,
            emit_diagnostics: config.output_hit_lines,
            rules,
        })
    }

    /// A category that never matches
    pub fn disabled(kind: CategoryKind) -> Self {
        Self {
            kind,
            enabled_overall: false,
            emit_diagnostics: false,
            rules: Vec::new(),
        }
    }

    /// Enabled overall and holding at least one enabled rule
    pub fn is_active(&self) -> bool {
        self.enabled_overall && self.rules.iter().any(|r| r.enabled)
    }
}

/// Every category, compiled
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub start: RuleCategory,
    pub end: RuleCategory,
    pub ignore: RuleCategory,
    pub replace_standard: RuleCategory,
    pub replace_markdown: RuleCategory,
    pub chart_start: RuleCategory,
    pub returns: RuleCategory,
    pub return_ignore: RuleCategory,
    pub header: RuleCategory,
}

impl RuleSet {
    /// Compile the configured rules. Fails on the first invalid pattern.
    pub fn compile(config: &RuleSetConfig) -> Result<Self, RuleError> {
        Ok(Self {
            start: RuleCategory::compile(CategoryKind::Start, &config.start_lines)?,
            end: RuleCategory::compile(CategoryKind::End, &config.end_lines)?,
            ignore: RuleCategory::compile(CategoryKind::Ignore, &config.ignore_lines)?,
            replace_standard: RuleCategory::compile(CategoryKind::ReplaceStandard, &config.replace_standard)?,
            replace_markdown: RuleCategory::compile(CategoryKind::ReplaceMarkdown, &config.replace_markdown)?,
            chart_start: RuleCategory::compile(CategoryKind::ChartStart, &config.chart_start_lines)?,
            returns: RuleCategory::compile(CategoryKind::Return, &config.return_lines)?,
            return_ignore: RuleCategory::compile(CategoryKind::ReturnIgnore, &config.return_ignore_lines)?,
            header: RuleCategory::compile(CategoryKind::Header, &config.header_lines)?,
        })
    }

    /// A rule set with every category disabled
    pub fn empty() -> Self {
        Self {
            start: RuleCategory::disabled(CategoryKind::Start),
            end: RuleCategory::disabled(CategoryKind::End),
            ignore: RuleCategory::disabled(CategoryKind::Ignore),
            replace_standard: RuleCategory::disabled(CategoryKind::ReplaceStandard),
            replace_markdown: RuleCategory::disabled(CategoryKind::ReplaceMarkdown),
            chart_start: RuleCategory::disabled(CategoryKind::ChartStart),
            returns: RuleCategory::disabled(CategoryKind::Return),
            return_ignore: RuleCategory::disabled(CategoryKind::ReturnIgnore),
            header: RuleCategory::disabled(CategoryKind::Header),
        }
    }

    pub fn category(&self, kind: CategoryKind) -> &RuleCategory {
        match kind {
            CategoryKind::Start => &self.start,
            CategoryKind::End => &self.end,
            CategoryKind::Ignore => &self.ignore,
            CategoryKind::ReplaceStandard => &self.replace_standard,
            CategoryKind::ReplaceMarkdown => &self.replace_markdown,
            CategoryKind::ChartStart => &self.chart_start,
            CategoryKind::Return => &self.returns,
            CategoryKind::ReturnIgnore => &self.return_ignore,
            CategoryKind::Header => &self.header,
        }
    }

    /// Replace categories in application order
    pub fn replace_categories(&self) -> [&RuleCategory; 2] {
        [&self.replace_standard, &self.replace_markdown]
    }
}

/// Convert a replacement written with backslash group references (`\1`,
/// `\g<name>`) into the `${1}` form the regex crate expects. A literal `$`
/// is escaped so it is never read as a group reference.
pub fn python_style_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while let Some(&d) = chars.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        group.push(d);
                        chars.next();
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                Some('g') => {
                    chars.next();
                    if chars.peek() == Some(&'<') {
                        chars.next();
                        let name: String = chars.by_ref().take_while(|&ch| ch != '>').collect();
                        out.push_str(&format!("${{{}}}", name));
                    } else {
                        out.push_str("\\g");
                    }
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }

    out
}
