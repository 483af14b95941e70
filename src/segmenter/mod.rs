// WHY: Pluggable sentence segmentation; exactly one strategy is chosen when the processor is built
// Both strategies report byte ranges into the caller's buffer, never copies

use std::sync::Arc;

pub mod locale;
pub mod prefixes;
pub mod rule_based;

pub use locale::{byte_ranges_from_utf16_lengths, LocaleSegmenter};
pub use prefixes::PrefixTable;
pub use rule_based::RuleSplitter;

use crate::annotation::ByteRange;
use crate::config::SplitMode;
use crate::error::Result;

/// Emits sentence byte ranges over a UTF-8 buffer.
///
/// Ranges lie inside `text`, come in document order and never overlap.
/// Bytes between two ranges form the gap between those sentences.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str, mode: SplitMode, language: Option<&str>) -> Result<Vec<ByteRange>>;
}

/// The segmentation strategy owned by a text processor
#[derive(Debug, Clone)]
pub enum SentenceSegmenter {
    /// Terminator patterns plus protected prefixes
    Rules(RuleSplitter),
    /// Shared locale-aware segmenter
    Locale(Arc<LocaleSegmenter>),
}

impl Segmenter for SentenceSegmenter {
    fn segment(&self, text: &str, mode: SplitMode, language: Option<&str>) -> Result<Vec<ByteRange>> {
        match self {
            SentenceSegmenter::Rules(splitter) => splitter.segment(text, mode, language),
            SentenceSegmenter::Locale(segmenter) => segmenter.segment(text, mode, language),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies_agree_on_simple_text() {
        let text = "One sentence. Another sentence.";
        let rules = SentenceSegmenter::Rules(RuleSplitter::new(PrefixTable::new()).unwrap());
        let locale = SentenceSegmenter::Locale(LocaleSegmenter::cached("en"));

        let from_rules = rules.segment(text, SplitMode::OneParagraphPerLine, None).unwrap();
        let from_locale = locale.segment(text, SplitMode::OneParagraphPerLine, Some("en")).unwrap();

        assert_eq!(from_rules.len(), 2);
        assert_eq!(from_locale.len(), 2);
        // The locale strategy keeps trailing whitespace inside the sentence.
        assert_eq!(&text[from_rules[0].as_range()], "One sentence.");
        assert_eq!(&text[from_locale[0].as_range()], "One sentence. ");
    }
}
