//! Rule set written to a fresh configuration file.
//!
//! The defaults target English research papers: extraction runs from the
//! introduction up to the references, page counters are dropped, numbered
//! section titles become Markdown headings, and common abbreviations do not
//! end a paragraph.

use crate::app_config::{RuleCategoryConfig, RuleConfig, RuleSetConfig};
use crate::reconstruction::rules::UNTERMINATED_BRACKET_PATTERN;

// Numbered section title such as "1.2.3. Results"
const NUMBERED_TITLE: &str = r"^\s*(\d+\s*\.\s*)+.{3,45}\s*$";
// Numbered section title without a trailing period such as "1.2.3 Results"
const BARE_NUMBERED_TITLE: &str = r"^\s*(\d+\s*\.\s*)*\d+\s*.{3,45}\s*$";

const SECTION_TITLES: [(&str, &str, &str); 8] = [
    (r"^\s*(\d+\s*\.?)?\s*introduction\s*$", "1. Introduction", "introduction"),
    (r"^\s*(\d+\s*\.?)?\s*related works?\s*$", "2. RELATED WORKS", "related work"),
    (r"^\s*(\d+\s*\.?)?\s*overview\s*$", "3 Overview", "overview"),
    (r"^\s*(\d+\s*\.?)?\s*algorithm\s*$", "4 ALGORITHM", "proposed algorithm"),
    (r"^\s*(\d+\s*\.?)?\s*experimental results?\s*$", "Experimental Result", "experimental results"),
    (r"^\s*(\d+\s*\.?)?\s*conclusions?\s*$", "CONCLUSION", "conclusion"),
    (r"^\s*(\d+\s*\.?)?\s*acknowledgements?\s*$", "ACKNOWLEDGEMENTS", "acknowledgements"),
    (r"^\s*(\d+\s*\.?)?\s*references?\s*$", "References", "references"),
];

/// The default rule set
pub fn default_rule_set() -> RuleSetConfig {
    RuleSetConfig {
        start_lines: RuleCategoryConfig::with_rules(vec![
            RuleConfig::new(r"\d+\s*\.?\s*introduction")
                .ignore_case()
                .example("1.2.3. Introduction")
                .remarks("pages before the introduction rarely have an extractable layout"),
            RuleConfig::new(r"Introduction\s*$")
                .example("(...) Introduction")
                .remarks("capitalised"),
            RuleConfig::new(r"INTRODUCTION\s*$")
                .example("(...) INTRODUCTION")
                .remarks("upper case"),
        ]),
        end_lines: RuleCategoryConfig::with_rules(vec![
            RuleConfig::new(r"^\s*references?\s*$")
                .ignore_case()
                .example("References")
                .remarks("nothing after the references is extracted"),
            RuleConfig::new(r"References?\s*$")
                .example("(...) References")
                .remarks("trailing s is optional"),
            RuleConfig::new(r"REFERENCES?\s*$")
                .example("(...) REFERENCES")
                .remarks("upper case"),
        ]),
        ignore_lines: RuleCategoryConfig::with_rules(vec![
            RuleConfig::new(r"^\s*\d+\s*:\s*\d+\s*$")
                .example("2 : 32")
                .remarks("page counter"),
            RuleConfig::new(r"^\s*\d+\s*of\s*\d+\s*$")
                .ignore_case()
                .example("4 of 14")
                .remarks("page counter"),
            RuleConfig::new(r"^\s*.\s*$")
                .example("a")
                .remarks("single character"),
            RuleConfig::new(r"^.*(\S{1,3}\s+){9,}.*$")
                .disabled()
                .example("T h i s i s a p e n .")
                .remarks("vertical or broken layouts; can swallow normal sentences"),
        ]),
        replace_standard: RuleCategoryConfig::with_rules(vec![
            RuleConfig::new(r"\s*\d*\s*:\s*\d*\s*")
                .disabled()
                .replacement(" ")
                .example("2 : 32")
                .remarks("page counter; broad, check before enabling"),
            RuleConfig::new(r"\s*\d+\s*of\s*\d+\s*")
                .disabled()
                .ignore_case()
                .replacement(" ")
                .example("4 of 14")
                .remarks("page counter; also a common phrase"),
        ]),
        replace_markdown: RuleCategoryConfig::with_rules(vec![
            RuleConfig::new(r"^\s*•")
                .replacement("-")
                .example("• item")
                .remarks("bullet to Markdown list item"),
        ]),
        chart_start_lines: RuleCategoryConfig::with_rules(vec![
            RuleConfig::new(r"^\s*(Fig\.|Figure|Table)\s*\d+\s*(\.|:|;)")
                .ignore_case()
                .example("Fig. 1. | Figure 2: | Table3;")
                .remarks("figure and table captions"),
        ]),
        return_lines: RuleCategoryConfig::with_rules(return_rules()),
        return_ignore_lines: RuleCategoryConfig::with_rules(vec![
            RuleConfig::new(r"\s+(e\.g|et al|etc|ex)\.$").example("e.g. | et al. | etc. | ex."),
            RuleConfig::new(r"\s+(ff|figs?|Figs?)\.$").example("ff. | fig. | figs."),
            RuleConfig::new(r"\s+(i\.e|illus)\.$").example("i.e. | illus."),
            RuleConfig::new(r"\s+ll\.$").example("ll."),
            RuleConfig::new(r"\s+(Mr|Ms|Mrs)\.$").example("Mr. | Ms. | Mrs."),
            RuleConfig::new(r"\s+(pp|par|pt)\.$").example("pp. | par. | pt."),
            RuleConfig::new(r"\s+sec\.$").example("sec."),
            RuleConfig::new(UNTERMINATED_BRACKET_PATTERN)
                .example("[Author et al. 2018;")
                .remarks("reference opened with [ but not yet closed"),
        ]),
        header_lines: RuleCategoryConfig::with_rules(header_rules()),
    }
}

fn return_rules() -> Vec<RuleConfig> {
    let mut rules = vec![
        RuleConfig::new(r"(\.|:|;)\s*$")
            .example("a pen. | as follows:")
            .remarks("sentence end at the right edge"),
        RuleConfig::new(r"\(\d+\)\s*$")
            .example("1 + 1 = 2 (1)")
            .remarks("equation number"),
        RuleConfig::new(NUMBERED_TITLE).example("1.2.3. Header"),
        RuleConfig::new(BARE_NUMBERED_TITLE).example("1.2.3 Header"),
    ];
    rules.extend(SECTION_TITLES.iter().map(|(pattern, example, remarks)| {
        RuleConfig::new(*pattern).ignore_case().example(*example).remarks(*remarks)
    }));
    rules
}

fn header_rules() -> Vec<RuleConfig> {
    let mut rules = vec![
        RuleConfig::new(NUMBERED_TITLE)
            .heading(r"\d+\s*\.\s*", r"\d+\s*\.\s*", 2)
            .example("1.2.3. Header")
            .remarks("each \"n.\" adds one level"),
        RuleConfig::new(BARE_NUMBERED_TITLE)
            .heading(r"\d+", r"\s*(\d+\s*\.\s*)*\d+\s*", 2)
            .example("1.2.3 Header")
            .remarks("numbering without trailing period; less reliable"),
    ];
    rules.extend(SECTION_TITLES.iter().map(|(pattern, example, remarks)| {
        RuleConfig::new(*pattern)
            .ignore_case()
            .heading(r"^$", r"\d+\s*\.\s*", 2)
            .example(*example)
            .remarks(*remarks)
    }));
    rules
}
