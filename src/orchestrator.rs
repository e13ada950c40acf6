//! Pipeline orchestrator for knowhow.
//!
//! Coordinates the path from transcript files to a queryable hybrid index.

use crate::config::Settings;
use crate::corpus::Corpus;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{KnowhowError, Result};
use crate::rag::ContextBuilder;
use crate::search::HybridIndex;
use crate::tokenizer::{create_tokenizer, TokenCounter};
use crate::transcript::Transcript;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the knowhow pipeline.
pub struct Orchestrator {
    settings: Settings,
    tokenizer: Arc<dyn TokenCounter>,
    embedder: Arc<dyn Embedder>,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let tokenizer: Arc<dyn TokenCounter> = Arc::from(create_tokenizer(
            settings.tokenizer.kind,
            &settings.tokenizer.encoding,
        )?);

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?);

        info!(
            "Using {} embeddings ({} dims)",
            settings.embedding.model, settings.embedding.dimensions
        );

        Ok(Self {
            settings,
            tokenizer,
            embedder,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        tokenizer: Arc<dyn TokenCounter>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            tokenizer,
            embedder,
        })
    }

    /// Load transcripts from the given paths and chunk them.
    ///
    /// With no paths, every transcript in the configured directory is used.
    pub fn load_corpus(&self, paths: &[PathBuf]) -> Result<Corpus> {
        let transcripts = load_transcripts(&self.settings, paths)?;
        Corpus::build(
            transcripts,
            self.settings.chunking.to_config(),
            self.tokenizer.as_ref(),
        )
    }

    /// Build the hybrid index over a corpus.
    pub async fn build_index(&self, corpus: Corpus) -> Result<HybridIndex> {
        HybridIndex::build(
            corpus,
            self.embedder.clone(),
            &self.settings.embedding.batch_options(),
        )
        .await
    }

    /// A context builder carrying the configured retrieval parameters.
    pub fn context_builder(&self, index: Arc<HybridIndex>) -> ContextBuilder {
        let retrieval = &self.settings.retrieval;
        ContextBuilder::new(index, self.tokenizer.clone())
            .with_top_k(retrieval.top_k)
            .with_alpha(retrieval.alpha)
            .with_window(retrieval.window)
            .with_max_tokens(retrieval.max_tokens_per_stitch)
    }
}

/// Load transcripts from explicit paths, or from the configured transcripts
/// directory when no paths are given.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn load_transcripts(settings: &Settings, paths: &[PathBuf]) -> Result<Vec<Transcript>> {
    let transcripts = if paths.is_empty() {
        let dir = settings.transcripts_dir();
        if !dir.is_dir() {
            return Err(KnowhowError::InvalidInput(format!(
                "No paths given and transcripts directory {} does not exist",
                dir.display()
            )));
        }
        Transcript::load_dir(&dir)?
    } else {
        Transcript::load_paths(paths)?
    };

    info!("Loaded {} transcripts", transcripts.len());
    Ok(transcripts)
}
