/*!
 * Document reconstruction.
 *
 * Turns the flat line list of an extracted document into translation units
 * and composes translated units back into a structured document.
 *
 * Stages, leaves first:
 * - `rules`: compiled rule categories
 * - `classifier`: first-match classification of a line
 * - `extraction`: the start/end window, ignore and replace rules
 * - `segmentation`: paragraph formation, interleaved with `batcher`
 * - `composer`: heading reconstruction and output composition
 *
 * Everything here is synchronous and free of I/O.
 */

pub mod batcher;
pub mod classifier;
pub mod composer;
pub mod document;
pub mod extraction;
pub mod rules;
pub mod segmentation;

pub use batcher::UnitBatcher;
pub use classifier::{classify, HitLog, RuleHit, RuleMatch};
pub use composer::{ComposeOptions, HeaderReconstructor, Heading, OutputComposer};
pub use document::{char_len, Document, Line, Paragraph, TranslationUnit};
pub use extraction::{Extraction, ExtractionOptions, ExtractionOutcome, ExtractionWindow};
pub use rules::{CategoryKind, Matcher, Rule, RuleAction, RuleCategory, RuleSet};
pub use segmentation::{Segmentation, Segmenter};
