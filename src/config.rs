// WHY: One validated configuration shared by the library and the CLI
// Option names mirror the command-line flags so JSON configs read the same way

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Sentence-splitting regime of the rule-based splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SplitMode {
    /// Every line holds exactly one sentence
    OneSentencePerLine,
    /// Every line holds one paragraph of possibly many sentences
    OneParagraphPerLine,
    /// Paragraphs are separated by blank lines and wrapped over several lines
    WrappedText,
}

impl SplitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::OneSentencePerLine => "sentence",
            SplitMode::OneParagraphPerLine => "paragraph",
            SplitMode::WrappedText => "wrapped_text",
        }
    }
}

impl FromStr for SplitMode {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self> {
        match mode {
            "sentence" => Ok(SplitMode::OneSentencePerLine),
            "paragraph" => Ok(SplitMode::OneParagraphPerLine),
            "wrapped_text" => Ok(SplitMode::WrappedText),
            other => Err(Error::UnknownSplitMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for SplitMode {
    type Error = Error;

    fn try_from(mode: String) -> Result<Self> {
        mode.parse()
    }
}

impl From<SplitMode> for String {
    fn from(mode: SplitMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sentence segmentation strategy a processor uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmenterKind {
    /// Pattern and prefix-file based splitter
    #[default]
    Rules,
    /// Locale-aware segmenter keyed by the source language
    Locale,
}

impl FromStr for SegmenterKind {
    type Err = Error;

    fn from_str(kind: &str) -> Result<Self> {
        match kind {
            "rules" => Ok(SegmenterKind::Rules),
            "locale" => Ok(SegmenterKind::Locale),
            other => Err(Error::Segmentation(format!(
                "unknown segmenter '{other}', choose one of rules, locale"
            ))),
        }
    }
}

/// Text processor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProcessorConfig {
    /// Maximum tokens per segment, EOS included
    pub max_length_break: usize,
    pub ssplit_mode: SplitMode,
    /// Protected prefix file; `${VAR}` references are expanded when loading
    pub ssplit_prefix_file: Option<String>,
    pub segmenter: SegmenterKind,
    /// Required by the locale segmenter
    pub source_language: Option<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_length_break: 128,
            ssplit_mode: SplitMode::OneParagraphPerLine,
            ssplit_prefix_file: None,
            segmenter: SegmenterKind::Rules,
            source_language: None,
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_length_break < 2 {
            return Err(Error::InvalidMaxLengthBreak(self.max_length_break));
        }
        if self.segmenter == SegmenterKind::Locale
            && self.source_language.as_deref().map_or(true, str::is_empty)
        {
            return Err(Error::MissingSourceLanguage);
        }
        Ok(())
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}

/// Replace every `${VAR}` in `path` with the value of environment variable `VAR`
pub fn interpolate_env_vars(path: &str) -> Result<String> {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find("${") {
        let after_open = &rest[open + 2..];
        let close = after_open
            .find('}')
            .ok_or_else(|| Error::UnterminatedInterpolation(path.to_string()))?;
        let var = &after_open[..close];
        let value = std::env::var(var).map_err(|_| Error::UndefinedEnvVar {
            var: var.to_string(),
            path: path.to_string(),
        })?;
        result.push_str(&rest[..open]);
        result.push_str(&value);
        rest = &after_open[close + 1..];
    }
    result.push_str(rest);
    Ok(result)
}
