// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests
#![allow(dead_code)]

use annotext::{PieceVocab, ProcessorConfig, TextProcessor, Vocabulary};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Temporary directory for prefix, vocabulary and config files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Write `content` below the fixture root, creating parent directories
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write the character vocabulary in .vocab format
    pub fn create_vocab_file(&self) -> PathBuf {
        let content: String = vocab_pieces()
            .iter()
            .map(|piece| format!("{piece}\t0\n"))
            .collect();
        self.create_file("source.vocab", &content)
    }
}

/// Control pieces, the meta space, single ASCII letters and punctuation, and a few words
pub fn vocab_pieces() -> Vec<String> {
    let mut pieces: Vec<String> = ["<unk>", "<s>", "</s>", "▁"].iter().map(|p| p.to_string()).collect();
    pieces.extend(('a'..='z').chain('A'..='Z').chain('0'..='9').map(String::from));
    pieces.extend([".", "!", "?", ",", "\"", "'"].iter().map(|p| p.to_string()));
    pieces.extend(["▁Hello", "▁World", "▁the", "ing"].iter().map(|p| p.to_string()));
    pieces
}

pub fn char_vocab() -> Arc<dyn Vocabulary> {
    Arc::new(PieceVocab::from_pieces(vocab_pieces()).expect("Fixture vocabulary is valid"))
}

pub fn processor_with(config: ProcessorConfig) -> TextProcessor {
    TextProcessor::new(config, char_vocab()).expect("Failed to build text processor")
}

pub fn processor(max_length_break: usize) -> TextProcessor {
    processor_with(ProcessorConfig {
        max_length_break,
        ..ProcessorConfig::default()
    })
}

/// Collapse whitespace runs to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
