pub mod annotation;
pub mod config;
pub mod error;
pub mod segmenter;
pub mod text_processor;
pub mod vocab;

// Re-export the types a translation pipeline touches directly
pub use annotation::{AnnotatedText, Annotation, ByteRange};
pub use config::{interpolate_env_vars, ProcessorConfig, SegmenterKind, SplitMode};
pub use error::{Error, Result};

// Re-export segmentation strategies for callers that bypass the processor
pub use segmenter::{LocaleSegmenter, PrefixTable, RuleSplitter, Segmenter, SentenceSegmenter};

pub use text_processor::TextProcessor;
pub use vocab::{PieceVocab, Segment, Segments, Vocabulary, Word};
