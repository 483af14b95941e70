// WHY: Single owned text buffer plus parallel index arrays describing sentences and tokens
// Tokens are never copied out; every query is arithmetic over `token_begin` and `gap`

use serde::Serialize;
use std::ops::Range;

pub mod whitespace;

pub use whitespace::{ensures_space_between_sentences, html_tags, omits_space_between_sentences};

/// Half-open `[begin, end)` interval of byte offsets into an owned text buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ByteRange {
    pub begin: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Zero-length range at `pos`, used for EOS markers
    pub fn empty_at(pos: usize) -> Self {
        Self { begin: pos, end: pos }
    }

    pub fn size(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.begin..self.end
    }

    /// Shift both ends forward, e.g. from sentence-relative to buffer-relative offsets
    pub fn offset(&self, by: usize) -> Self {
        Self {
            begin: self.begin + by,
            end: self.end + by,
        }
    }
}

impl From<Range<usize>> for ByteRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Sentence and token boundaries over a text buffer.
///
/// `token_begin` holds the start offset of every token, gap tokens included,
/// followed by the buffer length. `gap[s]` is the position in `token_begin`
/// of the gap token that precedes sentence `s`; the gap after the last
/// sentence is always the second-to-last entry of `token_begin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    token_begin: Vec<usize>,
    gap: Vec<usize>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            token_begin: vec![0, 0],
            gap: Vec::new(),
        }
    }
}

impl Annotation {
    pub fn num_sentences(&self) -> usize {
        self.gap.len()
    }

    /// Number of tokens in sentence `s`, EOS included
    pub fn num_words(&self, s: usize) -> usize {
        self.gap_slot(s + 1) - self.gap[s] - 1
    }

    /// Byte range of sentence `s`, from its first token start to its last token end
    pub fn sentence(&self, s: usize) -> ByteRange {
        ByteRange::new(
            self.token_begin[self.gap[s] + 1],
            self.token_begin[self.gap_slot(s + 1)],
        )
    }

    /// Byte range of token `w` of sentence `s`
    pub fn word(&self, s: usize, w: usize) -> ByteRange {
        debug_assert!(w < self.num_words(s), "word {w} out of range for sentence {s}");
        let slot = self.gap[s] + 1 + w;
        ByteRange::new(self.token_begin[slot], self.token_begin[slot + 1])
    }

    /// Byte range of gap `g`: gap 0 precedes the first sentence and gap
    /// `num_sentences()` trails the last one
    pub fn gap(&self, g: usize) -> ByteRange {
        let slot = self.gap_slot(g);
        ByteRange::new(self.token_begin[slot], self.token_begin[slot + 1])
    }

    pub fn token_begin(&self) -> &[usize] {
        &self.token_begin
    }

    pub fn gaps(&self) -> &[usize] {
        &self.gap
    }

    fn gap_slot(&self, g: usize) -> usize {
        if g < self.gap.len() {
            self.gap[g]
        } else {
            assert_eq!(g, self.gap.len(), "gap {g} out of range for {} sentences", self.gap.len());
            self.token_begin.len() - 2
        }
    }

    fn trailing_gap_slot(&self) -> usize {
        self.token_begin.len() - 2
    }
}

/// Text buffer annotated with sentence and token byte ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedText {
    text: String,
    annotation: Annotation,
    target_language: Option<String>,
}

impl Default for AnnotatedText {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl AnnotatedText {
    /// Take ownership of `text`; the whole buffer starts out as one trailing gap
    pub fn new(text: String) -> Self {
        let mut annotation = Annotation::default();
        annotation.token_begin[1] = text.len();
        Self {
            text,
            annotation,
            target_language: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Install the tag that drives inter-sentence whitespace; empty clears it
    pub fn set_target_language(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        self.target_language = if tag.is_empty() { None } else { Some(tag) };
    }

    pub fn target_language(&self) -> Option<&str> {
        self.target_language.as_deref()
    }

    pub fn should_omit_space_between_sentences(&self) -> bool {
        omits_space_between_sentences(self.target_language())
    }

    pub fn should_ensure_space_between_sentences(&self) -> bool {
        ensures_space_between_sentences(self.target_language())
    }

    /// Append gap material followed by a sentence whose tokens live outside the buffer.
    ///
    /// The tokens are copied in order and must be contiguous in their source.
    pub fn append_sentence(&mut self, prefix: &str, tokens: &[&str]) {
        self.assert_trailing_sentinel();
        self.handle_ending_whitespace(prefix, true);

        let gap_slot = self.annotation.trailing_gap_slot();
        self.annotation.gap.push(gap_slot);
        for token in tokens {
            self.text.push_str(token);
            self.annotation.token_begin.push(self.text.len());
        }
        // Reopen an empty trailing gap after the sentence.
        self.annotation.token_begin.push(self.text.len());
    }

    /// Extend the trailing gap, typically with the whitespace after the last sentence
    pub fn append_ending_whitespace(&mut self, gap: &str) {
        self.assert_trailing_sentinel();
        self.handle_ending_whitespace(gap, false);
    }

    /// Record a sentence whose token ranges already point into the buffer.
    ///
    /// Panics if a token lies outside the buffer, if tokens are not contiguous,
    /// or if the sentence starts before the end of the previous one.
    pub fn record_existing_sentence(&mut self, tokens: &[ByteRange], sentence_begin: usize) {
        let len = self.text.len();
        self.assert_trailing_sentinel();
        assert!(
            sentence_begin <= len,
            "sentence begin {sentence_begin} outside text of {len} bytes"
        );
        if let Some(first) = tokens.first() {
            assert_eq!(
                first.begin, sentence_begin,
                "sentence begin must coincide with its first token"
            );
        }
        let gap_slot = self.annotation.trailing_gap_slot();
        let gap_begin = self.annotation.token_begin[gap_slot];
        assert!(
            sentence_begin >= gap_begin,
            "sentence at {sentence_begin} starts before the previous sentence ends at {gap_begin}"
        );
        for (i, token) in tokens.iter().enumerate() {
            assert!(
                token.begin <= token.end && token.end <= len,
                "token {token:?} outside text of {len} bytes"
            );
            assert!(
                self.text.is_char_boundary(token.begin) && self.text.is_char_boundary(token.end),
                "token {token:?} splits a UTF-8 sequence"
            );
            if let Some(next) = tokens.get(i + 1) {
                assert_eq!(token.end, next.begin, "tokens {token:?} and {next:?} are not contiguous");
            }
        }

        self.annotation.gap.push(gap_slot);
        // Clip the size sentinel, then put it back after the sentence.
        self.annotation.token_begin.pop();
        self.annotation
            .token_begin
            .extend(tokens.iter().map(|token| token.begin));
        let sentence_end = tokens.last().map_or(sentence_begin, |token| token.end);
        self.annotation.token_begin.push(sentence_end);
        self.annotation.token_begin.push(len);
    }

    pub fn num_sentences(&self) -> usize {
        self.annotation.num_sentences()
    }

    pub fn num_words(&self, s: usize) -> usize {
        self.annotation.num_words(s)
    }

    pub fn sentence_as_byte_range(&self, s: usize) -> ByteRange {
        self.annotation.sentence(s)
    }

    pub fn word_as_byte_range(&self, s: usize, w: usize) -> ByteRange {
        self.annotation.word(s, w)
    }

    pub fn gap_as_byte_range(&self, g: usize) -> ByteRange {
        self.annotation.gap(g)
    }

    pub fn sentence(&self, s: usize) -> &str {
        &self.text[self.sentence_as_byte_range(s).as_range()]
    }

    pub fn word(&self, s: usize, w: usize) -> &str {
        &self.text[self.word_as_byte_range(s, w).as_range()]
    }

    pub fn gap(&self, g: usize) -> &str {
        &self.text[self.gap_as_byte_range(g).as_range()]
    }

    /// Build target-side text from per-sentence tokens, reusing the gaps of `source`.
    ///
    /// Sentence `s` of the result is preceded by gap `s` of `source` and the
    /// trailing gap of `source` closes the text, all filtered through the
    /// whitespace policy of `target_language`.
    pub fn assemble_target<S: AsRef<str>>(
        source: &AnnotatedText,
        sentences: &[Vec<S>],
        target_language: &str,
    ) -> AnnotatedText {
        assert_eq!(
            sentences.len(),
            source.num_sentences(),
            "one token list is needed per source sentence"
        );
        let mut target = AnnotatedText::default();
        target.set_target_language(target_language);
        for (s, tokens) in sentences.iter().enumerate() {
            let views: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
            target.append_sentence(source.gap(s), &views);
        }
        target.append_ending_whitespace(source.gap(source.num_sentences()));
        target
    }

    /// Append gap bytes according to the target-language whitespace policy
    fn handle_ending_whitespace(&mut self, gap: &str, between_sentences: bool) {
        if gap.contains('\n') {
            // Line breaks survive every script policy.
            self.text.push_str(gap);
        } else if self.should_omit_space_between_sentences() {
            for tag in html_tags(gap) {
                self.text.push_str(tag);
            }
        } else if !gap.is_empty() {
            self.text.push_str(gap);
        } else if between_sentences
            && self.should_ensure_space_between_sentences()
            && !self.text.is_empty()
        {
            self.text.push(' ');
        }

        let len = self.text.len();
        if let Some(last) = self.annotation.token_begin.last_mut() {
            *last = len;
        }
    }

    fn assert_trailing_sentinel(&self) {
        assert_eq!(
            self.annotation.token_begin.last().copied(),
            Some(self.text.len()),
            "annotation out of sync with text buffer"
        );
    }
}
