// WHY: Turns one raw document into an annotated source plus model-ready segments
// Every recorded token points into the document buffer, so the processor moves it in first

use std::sync::Arc;
use tracing::{debug, info};

use crate::annotation::{AnnotatedText, ByteRange};
use crate::config::{ProcessorConfig, SegmenterKind, SplitMode};
use crate::error::{Error, Result};
use crate::segmenter::{LocaleSegmenter, RuleSplitter, Segmenter, SentenceSegmenter};
use crate::vocab::{Segment, Segments, Vocabulary, Word};

/// Sentence splitting, sub-word encoding and length wrapping for one source language
pub struct TextProcessor {
    config: ProcessorConfig,
    vocab: Arc<dyn Vocabulary>,
    segmenter: SentenceSegmenter,
}

impl TextProcessor {
    /// Build a processor whose rule splitter reads `ssplit_prefix_file`
    pub fn new(config: ProcessorConfig, vocab: Arc<dyn Vocabulary>) -> Result<Self> {
        Self::with_prefix_memory(config, vocab, &[])
    }

    /// Build a processor from a serialized prefix table; non-empty `memory`
    /// takes priority over `ssplit_prefix_file`
    pub fn with_prefix_memory(
        config: ProcessorConfig,
        vocab: Arc<dyn Vocabulary>,
        memory: &[u8],
    ) -> Result<Self> {
        config.validate()?;
        let segmenter = match config.segmenter {
            SegmenterKind::Rules => {
                let splitter = if memory.is_empty() {
                    RuleSplitter::from_prefix_file(config.ssplit_prefix_file.as_deref().unwrap_or(""))?
                } else {
                    info!("Loading protected prefixes for sentence splitting from memory");
                    RuleSplitter::from_serialized(memory)?
                };
                SentenceSegmenter::Rules(splitter)
            }
            SegmenterKind::Locale => {
                let language = config
                    .source_language
                    .as_deref()
                    .filter(|tag| !tag.is_empty())
                    .ok_or(Error::MissingSourceLanguage)?;
                SentenceSegmenter::Locale(LocaleSegmenter::cached(language))
            }
        };

        info!(
            "Text processor ready: max-length-break={}, ssplit-mode={}, segmenter={:?}",
            config.max_length_break, config.ssplit_mode, config.segmenter
        );
        Ok(Self {
            config,
            vocab,
            segmenter,
        })
    }

    /// Take ownership of `input`, split it into sentences and encode each one.
    ///
    /// Sentences whose encoding is empty are skipped. Sentences longer than
    /// `max_length_break - 1` tokens are recorded as several sentences.
    pub fn process(&self, input: String) -> Result<(AnnotatedText, Segments)> {
        let mut source = AnnotatedText::new(input);
        let sentences = self.segmenter.segment(
            source.text(),
            self.config.ssplit_mode,
            self.config.source_language.as_deref(),
        )?;

        let mut segments = Segments::new();
        for sentence in &sentences {
            let (ids, ranges) = self
                .vocab
                .encode_with_byte_ranges(&source.text()[sentence.as_range()], false);
            if ids.is_empty() {
                continue;
            }
            let ranges: Vec<ByteRange> = ranges.iter().map(|range| range.offset(sentence.begin)).collect();
            self.wrap(&ids, &ranges, &mut segments, &mut source);
        }

        debug!(
            "Processed {} bytes: {} sentences found, {} recorded, {} segments",
            source.text().len(),
            sentences.len(),
            source.num_sentences(),
            segments.len()
        );
        Ok((source, segments))
    }

    /// Cut one encoded sentence into segments of at most `max_length_break`
    /// ids, EOS included, recording each piece as its own sentence in `source`.
    ///
    /// `ranges` are buffer offsets, one per id.
    pub fn wrap(&self, ids: &[Word], ranges: &[ByteRange], segments: &mut Segments, source: &mut AnnotatedText) {
        assert_eq!(ids.len(), ranges.len(), "one byte range is needed per token id");
        let width = self.config.max_length_break - 1;
        let eos = self.vocab.eos_id();

        for (chunk_ids, chunk_ranges) in ids.chunks(width).zip(ranges.chunks(width)) {
            let mut segment = Vec::with_capacity(chunk_ids.len() + 1);
            segment.extend_from_slice(chunk_ids);
            segment.push(eos);
            segments.push(segment);

            let first = chunk_ranges[0];
            let last = chunk_ranges[chunk_ranges.len() - 1];
            let mut words = Vec::with_capacity(chunk_ranges.len() + 1);
            words.extend_from_slice(chunk_ranges);
            words.push(ByteRange::empty_at(last.end));
            source.record_existing_sentence(&words, first.begin);
        }
    }

    /// Re-encode the sentences already marked in `source` without splitting
    /// or wrapping them, replacing its annotation.
    pub fn process_from_annotation(&self, source: &mut AnnotatedText) -> Segments {
        let mut replacement = AnnotatedText::new(source.text().to_string());
        if let Some(tag) = source.target_language() {
            replacement.set_target_language(tag);
        }

        let eos = self.vocab.eos_id();
        let mut segments = Segments::with_capacity(source.num_sentences());
        for s in 0..source.num_sentences() {
            let sentence = source.sentence_as_byte_range(s);
            let (mut segment, ranges) = self
                .vocab
                .encode_with_byte_ranges(&source.text()[sentence.as_range()], false);
            let mut words: Vec<ByteRange> = ranges.iter().map(|range| range.offset(sentence.begin)).collect();
            let end = words.last().map_or(sentence.end, |last| last.end);
            let begin = words.first().map_or(end, |first| first.begin);
            segment.push(eos);
            words.push(ByteRange::empty_at(end));

            replacement.record_existing_sentence(&words, begin);
            segments.push(segment);
        }

        *source = replacement;
        segments
    }

    /// Rebuild target-side text from `segments` under the whitespace policy of
    /// `target_language`, one target sentence per segmenter sentence.
    ///
    /// Pieces that `wrap` cut from one sentence are decoded and joined again
    /// before assembly, so no gap is introduced at wrap points.
    pub fn reassemble_target(
        &self,
        source: &AnnotatedText,
        segments: &[Segment],
        target_language: &str,
    ) -> Result<AnnotatedText> {
        assert_eq!(
            segments.len(),
            source.num_sentences(),
            "one segment is needed per recorded sentence"
        );
        let sentences = self.segmenter.segment(
            source.text(),
            self.config.ssplit_mode,
            self.config.source_language.as_deref(),
        )?;

        let mut grouped = AnnotatedText::new(source.text().to_string());
        let mut decoded: Vec<Vec<String>> = Vec::new();
        let mut enclosing = sentences.iter();
        let mut s = 0;
        while s < source.num_sentences() {
            let first = source.sentence_as_byte_range(s);
            let limit = enclosing
                .find(|sentence| sentence.end > first.begin)
                .map_or(first.end, |sentence| sentence.end);

            let mut end = first.end;
            let mut text = self.vocab.decode(&segments[s]);
            s += 1;
            while s < source.num_sentences() && source.sentence_as_byte_range(s).begin < limit {
                end = source.sentence_as_byte_range(s).end;
                text.push_str(&self.vocab.decode(&segments[s]));
                s += 1;
            }

            grouped.record_existing_sentence(&[ByteRange::new(first.begin, end)], first.begin);
            // The word-boundary space of the first piece lives in the source gap.
            decoded.push(vec![text.trim_start().to_string()]);
        }

        Ok(AnnotatedText::assemble_target(&grouped, &decoded, target_language))
    }

    pub fn max_length_break(&self) -> usize {
        self.config.max_length_break
    }

    pub fn split_mode(&self) -> SplitMode {
        self.config.ssplit_mode
    }

    pub fn segmenter(&self) -> &SentenceSegmenter {
        &self.segmenter
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn vocab(&self) -> &dyn Vocabulary {
        self.vocab.as_ref()
    }
}
