use annotext::{AnnotatedText, PieceVocab, ProcessorConfig, SegmenterKind, SplitMode, TextProcessor};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "annotext")]
#[command(about = "Split source text into sentences and byte-annotated translation segments")]
#[command(version)]
struct Args {
    /// Input files or glob patterns; stdin when empty
    inputs: Vec<String>,

    /// SentencePiece-style .vocab file of the source language
    #[arg(long)]
    vocab: PathBuf,

    /// Maximum tokens per segment, EOS included
    #[arg(long, default_value_t = 128)]
    max_length_break: usize,

    /// Sentence split mode: sentence, paragraph or wrapped_text
    #[arg(long, default_value = "paragraph")]
    ssplit_mode: SplitMode,

    /// File with protected prefixes; ${VAR} references are expanded
    #[arg(long)]
    ssplit_prefix_file: Option<String>,

    /// Segmentation strategy: rules or locale
    #[arg(long, default_value = "rules")]
    segmenter: SegmenterKind,

    /// Source language tag, required by the locale segmenter
    #[arg(long)]
    source_language: Option<String>,

    /// Also emit the source re-assembled under this language's whitespace policy
    #[arg(long)]
    target_language: Option<String>,

    /// JSON processor config; replaces the processor flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,
}

impl Args {
    fn processor_config(&self) -> Result<ProcessorConfig> {
        if let Some(path) = &self.config {
            info!("Loading processor config from {}", path.display());
            return ProcessorConfig::from_json_file(path)
                .with_context(|| format!("Invalid processor config {}", path.display()));
        }
        Ok(ProcessorConfig {
            max_length_break: self.max_length_break,
            ssplit_mode: self.ssplit_mode,
            ssplit_prefix_file: self.ssplit_prefix_file.clone(),
            segmenter: self.segmenter,
            source_language: self.source_language.clone(),
        })
    }
}

#[derive(Serialize)]
struct SentenceReport<'a> {
    range: annotext::ByteRange,
    text: &'a str,
    words: Vec<annotext::ByteRange>,
    segment: &'a [annotext::Word],
}

#[derive(Serialize)]
struct DocumentReport<'a> {
    input: &'a str,
    gaps: Vec<&'a str>,
    sentences: Vec<SentenceReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging on stderr keeps stdout free for document reports
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!("Starting annotext");
    info!(?args, "Parsed CLI arguments");

    let config = args.processor_config()?;
    let vocab = PieceVocab::from_file(&args.vocab)
        .with_context(|| format!("Failed to load vocabulary {}", args.vocab.display()))?;
    let processor = TextProcessor::new(config, Arc::new(vocab)).context("Failed to build text processor")?;

    let inputs = expand_inputs(&args.inputs)?;
    if inputs.is_empty() {
        // WHY: no inputs means filter mode over stdin
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        process_document(&processor, "-", text, args.target_language.as_deref())?;
        return Ok(());
    }

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(inputs.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}")
                .context("Invalid progress template")?
                .progress_chars("##-"),
        );
        bar
    };

    for path in &inputs {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path.display().to_string();
        process_document(&processor, &name, text, args.target_language.as_deref())?;
        progress.set_message(name);
        progress.inc(1);
    }
    progress.finish_with_message("Complete");

    info!("Processed {} documents", inputs.len());
    Ok(())
}

/// Resolve glob patterns; a pattern matching nothing is used as a literal path
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for entry in glob::glob(pattern).with_context(|| format!("Invalid glob pattern {pattern}"))? {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => warn!("Skipping unreadable glob match: {}", e),
            }
        }
        if paths.len() == before {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

fn process_document(
    processor: &TextProcessor,
    input: &str,
    text: String,
    target_language: Option<&str>,
) -> Result<()> {
    let (source, segments) = processor
        .process(text)
        .with_context(|| format!("Failed to process {input}"))?;

    let target = target_language
        .map(|tag| processor.reassemble_target(&source, &segments, tag))
        .transpose()
        .with_context(|| format!("Failed to re-assemble {input}"))?;

    let report = DocumentReport {
        input,
        gaps: (0..=source.num_sentences()).map(|g| source.gap(g)).collect(),
        sentences: segments
            .iter()
            .enumerate()
            .map(|(s, segment)| SentenceReport {
                range: source.sentence_as_byte_range(s),
                text: source.sentence(s),
                words: (0..source.num_words(s)).map(|w| source.word_as_byte_range(s, w)).collect(),
                segment,
            })
            .collect(),
        target: target.as_ref().map(AnnotatedText::text),
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
