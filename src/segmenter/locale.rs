// WHY: Locale-aware segmentation through UAX #29 sentence boundaries
// Instances are cached per language tag for the whole process; building one per request is wasteful

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

use super::Segmenter;
use crate::annotation::ByteRange;
use crate::config::SplitMode;
use crate::error::{Error, Result};

static SEGMENTERS: OnceLock<RwLock<HashMap<String, Arc<LocaleSegmenter>>>> = OnceLock::new();

/// Sentence segmenter for one language tag.
///
/// Reported sentences cover the text contiguously; whitespace after a
/// sentence belongs to it, as with host segmentation services.
#[derive(Debug)]
pub struct LocaleSegmenter {
    language: String,
}

impl LocaleSegmenter {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Process-wide instance for `language`, created on first use and never dropped
    pub fn cached(language: &str) -> Arc<Self> {
        let cache = SEGMENTERS.get_or_init(Default::default);
        if let Some(segmenter) = cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(language)
        {
            return Arc::clone(segmenter);
        }

        let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
        let segmenter = cache.entry(language.to_string()).or_insert_with(|| {
            info!("Creating sentence segmenter for language '{}'", language);
            Arc::new(Self::new(language))
        });
        Arc::clone(segmenter)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Sentence byte ranges, accumulated from the UTF-8 length of each segment
    pub fn sentences(&self, text: &str) -> Vec<ByteRange> {
        let mut end = 0;
        text.split_sentence_bounds()
            .map(|sentence| {
                let begin = end;
                end += sentence.len();
                ByteRange::new(begin, end)
            })
            .collect()
    }
}

impl Segmenter for LocaleSegmenter {
    fn segment(&self, text: &str, _mode: SplitMode, language: Option<&str>) -> Result<Vec<ByteRange>> {
        match language {
            Some(tag) if tag != self.language => Ok(Self::cached(tag).sentences(text)),
            _ => Ok(self.sentences(text)),
        }
    }
}

/// Convert consecutive sentence lengths counted in UTF-16 code units into
/// UTF-8 byte ranges over `text`.
///
/// For adapters around external segmentation services that report lengths
/// in UTF-16 units. [`LocaleSegmenter`] measures UTF-8 directly and does not
/// need it.
pub fn byte_ranges_from_utf16_lengths(text: &str, lengths: &[usize]) -> Result<Vec<ByteRange>> {
    let mut chars = text.char_indices();
    let mut ranges = Vec::with_capacity(lengths.len());
    let mut byte_pos = 0;
    for (index, &units) in lengths.iter().enumerate() {
        let begin = byte_pos;
        let mut remaining = units;
        while remaining > 0 {
            let (pos, c) = chars.next().ok_or_else(|| {
                Error::Segmentation(format!("sentence {index} runs past the end of the text"))
            })?;
            let width = c.len_utf16();
            if width > remaining {
                return Err(Error::Segmentation(format!(
                    "sentence {index} ends inside the character at byte {pos}"
                )));
            }
            remaining -= width;
            byte_pos = pos + c.len_utf8();
        }
        ranges.push(ByteRange::new(begin, byte_pos));
    }
    Ok(ranges)
}
