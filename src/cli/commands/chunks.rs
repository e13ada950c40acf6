//! Chunks command implementation.

use crate::cli::output::content_preview;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::Corpus;
use crate::orchestrator::load_transcripts;
use crate::tokenizer::create_tokenizer;
use anyhow::Result;
use std::path::PathBuf;

/// Run the chunks command: chunk the transcripts and report token sizes.
pub fn run_chunks(paths: &[PathBuf], limit: usize, settings: Settings) -> Result<()> {
    preflight::check(Operation::Chunks)?;
    settings.validate()?;

    let transcripts = match load_transcripts(&settings, paths) {
        Ok(transcripts) => transcripts,
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    let tokenizer = create_tokenizer(settings.tokenizer.kind, &settings.tokenizer.encoding)?;
    let corpus = Corpus::build(transcripts, settings.chunking.to_config(), tokenizer.as_ref())?;

    if corpus.is_empty() {
        Output::info("No chunks produced. Are the transcripts empty?");
        return Ok(());
    }

    Output::header(&format!("Chunks per transcript ({})", corpus.transcripts().len()));
    for (document_id, count) in corpus.chunk_counts() {
        Output::kv(document_id, &count.to_string());
    }

    let report = corpus.token_report(tokenizer.as_ref());
    let total: usize = report.iter().map(|s| s.token_len).sum();

    Output::header(&format!("Largest chunks (top {})", limit.min(report.len())));
    for stats in report.iter().take(limit) {
        let text = corpus
            .chunks_for(&stats.document_id)
            .find(|c| c.chunk_index == stats.chunk_index)
            .map(|c| content_preview(&c.text, 60))
            .unwrap_or_default();
        Output::list_item(&format!(
            "{} #{} lines {}-{}: {} tokens, {} chars  {}",
            stats.document_id,
            stats.chunk_index,
            stats.start_line,
            stats.end_line,
            stats.token_len,
            stats.char_len,
            text
        ));
    }

    println!();
    Output::kv("Total chunks", &report.len().to_string());
    Output::kv("Total tokens", &total.to_string());
    Output::kv(
        "Mean tokens",
        &format!("{:.1}", total as f64 / report.len() as f64),
    );

    Ok(())
}
