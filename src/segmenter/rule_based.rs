// WHY: Regex candidates plus prefix checks, the same two-phase shape as dictionary post-processing
// Candidates come from one meta::Regex; the prefix table vetoes false boundaries afterwards

use regex_automata::meta::Regex;
use tracing::{debug, info, warn};

use super::{prefixes::PrefixTable, Segmenter};
use crate::annotation::ByteRange;
use crate::config::{interpolate_env_vars, SplitMode};
use crate::error::Result;

/// Terminator run followed by optional closing quotes and brackets
const TERMINATOR_PATTERN: &str = r#"(?:[.?!\x{2026}]+|[\x{3002}\x{FF01}\x{FF1F}]+)["')\]\x{BB}\x{2019}\x{201D}\x{300D}\x{300F}\x{FF09}]*"#;

/// Full-width terminators split even without following whitespace
const FULLWIDTH_TERMINATORS: &[char] = &['\u{3002}', '\u{FF01}', '\u{FF1F}'];

/// Punctuation allowed in front of the first letter of a sentence
const OPENING_PUNCTUATION: &[char] = &[
    '"', '\'', '(', '[', '\u{BF}', '\u{A1}', '\u{AB}', '\u{2018}', '\u{201C}', '\u{300C}', '\u{300E}',
];

/// Rule-based sentence splitter driven by terminator patterns and protected prefixes
#[derive(Debug, Clone)]
pub struct RuleSplitter {
    prefixes: PrefixTable,
    terminators: Regex,
}

impl RuleSplitter {
    pub fn new(prefixes: PrefixTable) -> Result<Self> {
        let terminators = Regex::new(TERMINATOR_PATTERN)?;
        debug!("Compiled sentence terminator pattern: {}", TERMINATOR_PATTERN);
        Ok(Self {
            prefixes,
            terminators,
        })
    }

    /// Load protected prefixes from a file; `${VAR}` references in the path are expanded.
    /// An empty path selects pure pattern-based splitting.
    pub fn from_prefix_file(path: &str) -> Result<Self> {
        if path.is_empty() {
            warn!(
                "Missing list of protected prefixes for sentence splitting. \
                 Set with --ssplit-prefix-file."
            );
            return Self::new(PrefixTable::new());
        }
        let path = interpolate_env_vars(path)?;
        info!("Loading protected prefixes for sentence splitting from {}", path);
        Self::new(PrefixTable::from_file(&path)?)
    }

    /// Load protected prefixes from a serialized table; empty memory means no prefixes
    pub fn from_serialized(memory: &[u8]) -> Result<Self> {
        if memory.is_empty() {
            return Self::new(PrefixTable::new());
        }
        Self::new(PrefixTable::from_serialized(memory)?)
    }

    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Sentence ranges of `text` in document order, trimmed and non-empty
    pub fn split(&self, text: &str, mode: SplitMode) -> Vec<ByteRange> {
        let mut sentences = Vec::new();
        match mode {
            SplitMode::OneSentencePerLine => {
                sentences.extend(
                    lines(text)
                        .map(|line| trim(text, line))
                        .filter(|line| !line.is_empty()),
                );
            }
            SplitMode::OneParagraphPerLine => {
                for line in lines(text) {
                    let paragraph = trim(text, line);
                    if !paragraph.is_empty() {
                        self.split_paragraph(text, paragraph, &mut sentences);
                    }
                }
            }
            SplitMode::WrappedText => {
                for paragraph in wrapped_paragraphs(text) {
                    self.split_paragraph(text, paragraph, &mut sentences);
                }
            }
        }
        sentences
    }

    fn split_paragraph(&self, text: &str, paragraph: ByteRange, out: &mut Vec<ByteRange>) {
        let body = &text[paragraph.as_range()];
        let mut start = 0;
        for candidate in self.terminators.find_iter(body) {
            let end = candidate.end();
            if end >= body.len() {
                break;
            }
            if candidate.start() < start {
                continue;
            }
            let terminator = &body[candidate.start()..end];
            let rest = &body[end..];
            if !self.is_boundary(&body[start..candidate.start()], terminator, rest) {
                continue;
            }
            let sentence = trim(text, ByteRange::new(paragraph.begin + start, paragraph.begin + end));
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end + (rest.len() - rest.trim_start().len());
        }

        let tail = trim(text, ByteRange::new(paragraph.begin + start, paragraph.end));
        if !tail.is_empty() {
            out.push(tail);
        }
    }

    fn is_boundary(&self, preceding: &str, terminator: &str, rest: &str) -> bool {
        if terminator.contains(FULLWIDTH_TERMINATORS) {
            return true;
        }
        if !rest.starts_with(char::is_whitespace) {
            return false;
        }
        let next = rest.trim_start();
        if !starts_sentence(next) {
            return false;
        }
        if terminator.chars().all(|c| c == '.') {
            let word = last_word(preceding);
            if !word.is_empty() {
                if self.prefixes.is_nonbreaking(word) {
                    return false;
                }
                // Acronyms such as "U.S" keep their final period.
                if word.contains('.') && word.chars().any(char::is_alphabetic) {
                    return false;
                }
                if self.prefixes.is_numeric_only(word) && next.starts_with(|c: char| c.is_ascii_digit()) {
                    return false;
                }
            }
        }
        true
    }
}

impl Segmenter for RuleSplitter {
    fn segment(&self, text: &str, mode: SplitMode, _language: Option<&str>) -> Result<Vec<ByteRange>> {
        Ok(self.split(text, mode))
    }
}

/// Uppercase, digit or caseless letter, after optional opening punctuation
fn starts_sentence(next: &str) -> bool {
    let first = next.trim_start_matches(OPENING_PUNCTUATION).chars().next();
    match first {
        Some(c) => c.is_numeric() || (c.is_alphabetic() && !c.is_lowercase()),
        None => false,
    }
}

/// Word directly before a terminator, stripped of leading punctuation
fn last_word(preceding: &str) -> &str {
    let word = preceding
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or(preceding);
    word.trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '.' || c == '-'))
}

/// Line ranges including their terminating newline
fn lines(text: &str) -> impl Iterator<Item = ByteRange> + '_ {
    let mut start = 0;
    text.split_inclusive('\n').map(move |line| {
        let range = ByteRange::new(start, start + line.len());
        start = range.end;
        range
    })
}

/// Paragraphs separated by blank lines, trimmed
fn wrapped_paragraphs(text: &str) -> Vec<ByteRange> {
    let mut paragraphs = Vec::new();
    let mut current: Option<ByteRange> = None;
    for line in lines(text) {
        if text[line.as_range()].trim().is_empty() {
            if let Some(paragraph) = current.take() {
                paragraphs.push(trim(text, paragraph));
            }
            continue;
        }
        current = Some(match current {
            Some(paragraph) => ByteRange::new(paragraph.begin, line.end),
            None => line,
        });
    }
    if let Some(paragraph) = current {
        paragraphs.push(trim(text, paragraph));
    }
    paragraphs
}

fn trim(text: &str, range: ByteRange) -> ByteRange {
    let slice = &text[range.as_range()];
    let leading = slice.len() - slice.trim_start().len();
    let begin = range.begin + leading;
    ByteRange::new(begin, begin + slice.trim().len())
}
