// WHY: Sub-word encoder seam; the processor only needs ids plus the byte range each id covers
// PieceVocab is a greedy SentencePiece-style table so the pipeline runs without a model runtime

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::annotation::ByteRange;
use crate::error::{Error, Result};

/// Vocabulary token id
pub type Word = u32;

/// Token ids for one model forward pass
pub type Segment = Vec<Word>;

/// Segments in document order
pub type Segments = Vec<Segment>;

/// Word-boundary meta symbol standing in for whitespace
pub const SPACE_SYMBOL: char = '\u{2581}';

pub const UNK_PIECE: &str = "<unk>";
pub const BOS_PIECE: &str = "<s>";
pub const EOS_PIECE: &str = "</s>";

/// Source vocabulary able to report the bytes behind each produced id.
///
/// Implementations run in inference mode: encoding is deterministic.
pub trait Vocabulary: Send + Sync {
    /// Encode `text`, returning ids and one range per id relative to `text`.
    /// Ranges are contiguous and non-overlapping. With `add_eos` the last id is
    /// EOS, paired with a zero-length range at the end of the last real token.
    fn encode_with_byte_ranges(&self, text: &str, add_eos: bool) -> (Segment, Vec<ByteRange>);

    fn eos_id(&self) -> Word;

    fn unk_id(&self) -> Word;

    /// Surface form of `id`, if known
    fn piece(&self, id: Word) -> Option<&str>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render ids back to text, skipping control pieces and turning the
    /// meta symbol back into spaces
    fn decode(&self, ids: &[Word]) -> String {
        let mut out = String::new();
        for &id in ids {
            if id == self.eos_id() {
                continue;
            }
            match self.piece(id) {
                Some(piece) if piece != BOS_PIECE => {
                    out.extend(piece.chars().map(|c| if c == SPACE_SYMBOL { ' ' } else { c }))
                }
                _ => {}
            }
        }
        out
    }
}

/// Piece table encoded by greedy longest match
#[derive(Debug, Clone)]
pub struct PieceVocab {
    pieces: Vec<String>,
    ids: HashMap<String, Word>,
    max_piece_chars: usize,
    unk_id: Word,
    eos_id: Word,
}

impl PieceVocab {
    /// Build from pieces in id order; `<unk>` and `</s>` must be among them
    pub fn from_pieces<I, S>(pieces: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pieces: Vec<String> = pieces.into_iter().map(Into::into).collect();
        let mut ids = HashMap::with_capacity(pieces.len());
        let mut max_piece_chars = 0;
        for (id, piece) in pieces.iter().enumerate() {
            if piece.is_empty() {
                return Err(Error::Vocabulary(format!("empty piece at id {id}")));
            }
            let id = Word::try_from(id)
                .map_err(|_| Error::Vocabulary("more pieces than token ids".to_string()))?;
            // First occurrence wins, like the line order of a .vocab file.
            ids.entry(piece.clone()).or_insert(id);
            max_piece_chars = max_piece_chars.max(piece.chars().count());
        }

        let lookup = |piece: &str| {
            ids.get(piece)
                .copied()
                .ok_or_else(|| Error::Vocabulary(format!("missing required piece {piece}")))
        };
        let unk_id = lookup(UNK_PIECE)?;
        let eos_id = lookup(EOS_PIECE)?;

        Ok(Self {
            pieces,
            ids,
            max_piece_chars,
            unk_id,
            eos_id,
        })
    }

    /// Parse SentencePiece `.vocab` content: `piece[\tscore]` per line, id = line number
    pub fn from_vocab_str(content: &str) -> Result<Self> {
        let pieces = content
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.split('\t').next().unwrap_or(line).to_string());
        Self::from_pieces(pieces)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let vocab = Self::from_vocab_str(&content)?;
        info!("Loaded vocabulary of {} pieces from {}", vocab.len(), path.display());
        Ok(vocab)
    }

    pub fn id(&self, piece: &str) -> Option<Word> {
        self.ids.get(piece).copied()
    }

    /// Whitespace-normalized symbols of `text`, each with the original bytes it stands for
    fn normalize(text: &str) -> Vec<(char, ByteRange)> {
        let mut symbols = Vec::with_capacity(text.len() + 1);
        let content_start = match text.find(|c: char| !c.is_whitespace()) {
            Some(pos) => pos,
            None => return symbols,
        };
        // Dummy prefix; it absorbs any leading whitespace.
        symbols.push((SPACE_SYMBOL, ByteRange::new(0, content_start)));

        let mut whitespace_start = None;
        for (pos, c) in text[content_start..].char_indices() {
            let pos = pos + content_start;
            if c.is_whitespace() {
                whitespace_start.get_or_insert(pos);
                continue;
            }
            if let Some(start) = whitespace_start.take() {
                symbols.push((SPACE_SYMBOL, ByteRange::new(start, pos)));
            }
            symbols.push((c, ByteRange::new(pos, pos + c.len_utf8())));
        }
        symbols
    }
}

impl Vocabulary for PieceVocab {
    fn encode_with_byte_ranges(&self, text: &str, add_eos: bool) -> (Segment, Vec<ByteRange>) {
        let symbols = Self::normalize(text);
        let mut ids = Vec::with_capacity(symbols.len() + 1);
        let mut ranges = Vec::with_capacity(symbols.len() + 1);

        let mut candidate = String::new();
        let mut i = 0;
        while i < symbols.len() {
            candidate.clear();
            let mut best = None;
            for (j, (c, _)) in symbols[i..].iter().take(self.max_piece_chars).enumerate() {
                candidate.push(*c);
                if let Some(&id) = self.ids.get(candidate.as_str()) {
                    best = Some((id, j + 1));
                }
            }
            let (id, width) = best.unwrap_or((self.unk_id, 1));
            ids.push(id);
            ranges.push(ByteRange::new(symbols[i].1.begin, symbols[i + width - 1].1.end));
            i += width;
        }

        if add_eos {
            let end = ranges.last().map_or(text.len(), |last| last.end);
            ids.push(self.eos_id);
            ranges.push(ByteRange::empty_at(end));
        }
        (ids, ranges)
    }

    fn eos_id(&self) -> Word {
        self.eos_id
    }

    fn unk_id(&self) -> Word {
        self.unk_id
    }

    fn piece(&self, id: Word) -> Option<&str> {
        self.pieces.get(id as usize).map(String::as_str)
    }

    fn len(&self) -> usize {
        self.pieces.len()
    }
}
