//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::format_blocks_for_display;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line overrides for the configured retrieval parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchOverrides {
    pub top_k: Option<usize>,
    pub alpha: Option<f32>,
    pub window: Option<usize>,
    pub max_tokens: Option<usize>,
}

impl SearchOverrides {
    fn apply(&self, settings: &mut Settings) {
        let retrieval = &mut settings.retrieval;
        if let Some(top_k) = self.top_k {
            retrieval.top_k = top_k;
        }
        if let Some(alpha) = self.alpha {
            retrieval.alpha = alpha;
        }
        if let Some(window) = self.window {
            retrieval.window = window;
        }
        if let Some(max_tokens) = self.max_tokens {
            retrieval.max_tokens_per_stitch = max_tokens;
        }
    }
}

/// Run the search command.
pub async fn run_search(
    query: &str,
    paths: &[PathBuf],
    overrides: &SearchOverrides,
    json: bool,
    mut settings: Settings,
) -> Result<()> {
    overrides.apply(&mut settings);

    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let corpus = orchestrator.load_corpus(paths)?;
    if corpus.is_empty() {
        Output::warning("No transcript lines found to search.");
        return Ok(());
    }

    let spinner = Output::spinner(&format!("Embedding {} chunks...", corpus.len()));
    let index = orchestrator.build_index(corpus).await;
    spinner.finish_and_clear();

    let index = match index {
        Ok(index) => Arc::new(index),
        Err(e) => {
            Output::error(&format!("Indexing failed: {}", e));
            return Err(e.into());
        }
    };

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.context_builder(index).build(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(blocks) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else if blocks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} context blocks", blocks.len()));
                for (i, block) in blocks.iter().enumerate() {
                    Output::block(i + 1, block);
                }
                Output::header("Sources");
                println!("{}", format_blocks_for_display(&blocks));
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_values() {
        let mut settings = Settings::default();
        let overrides = SearchOverrides {
            top_k: Some(5),
            alpha: Some(0.0),
            ..Default::default()
        };
        overrides.apply(&mut settings);

        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.retrieval.alpha, 0.0);
        assert_eq!(settings.retrieval.window, 1);
        assert_eq!(settings.retrieval.max_tokens_per_stitch, 1000);
    }
}
