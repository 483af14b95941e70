// WHY: Recoverable failures surface as one typed enum; broken index invariants panic instead

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring or running source-text preparation
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown sentence split mode
    #[error("unknown ssplit mode '{0}', choose one of sentence, paragraph, wrapped_text")]
    UnknownSplitMode(String),

    /// Segments need room for at least one token plus EOS
    #[error("max-length-break must be at least 2, got {0}")]
    InvalidMaxLengthBreak(usize),

    /// `${` without a closing `}` in an interpolated path
    #[error("'${{' without matching '}}' in '{0}'")]
    UnterminatedInterpolation(String),

    /// Interpolated path names an environment variable that is not set
    #[error("environment variable '{var}' not defined in '{path}'")]
    UndefinedEnvVar {
        /// Name of the missing variable
        var: String,
        /// Path being interpolated
        path: String,
    },

    /// Reading a prefix, vocabulary or config file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialized prefix table or JSON config could not be decoded
    #[error("malformed serialized data: {0}")]
    Serialized(#[from] serde_json::Error),

    /// Boundary pattern failed to compile
    #[error("failed to build sentence boundary pattern: {0}")]
    Pattern(#[from] regex_automata::meta::BuildError),

    /// Vocabulary is missing required entries or is otherwise unusable
    #[error("invalid vocabulary: {0}")]
    Vocabulary(String),

    /// Host-locale segmentation was selected without a source language tag
    #[error("host-locale segmentation requires a source language tag")]
    MissingSourceLanguage,

    /// Host segmentation reported ranges that do not fit the text
    #[error("segmentation failed: {0}")]
    Segmentation(String),
}

/// Result type for annotext operations
pub type Result<T> = std::result::Result<T, Error>;
