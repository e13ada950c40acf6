//! Configuration settings for knowhow.

use crate::chunking::ChunkingConfig;
use crate::embedding::BatchOptions;
use crate::error::{KnowhowError, Result};
use crate::tokenizer::TokenizerKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub tokenizer: TokenizerSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory searched for transcripts when no paths are given.
    pub transcripts_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            transcripts_dir: "~/.knowhow/transcripts".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Token counting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerSettings {
    /// Counter to use (bpe, whitespace).
    pub kind: TokenizerKind,
    /// BPE encoding or model name (for the bpe counter).
    pub encoding: String,
}

impl Default for TokenizerSettings {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::Bpe,
            encoding: "cl100k_base".to_string(),
        }
    }
}

/// Content chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk size in tokens.
    pub chunk_tokens: usize,
    /// Tokens carried over between neighbouring chunks.
    pub overlap_tokens: usize,
    /// Minimum chunk size in tokens (except a transcript's last chunk).
    pub min_tokens: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_tokens: config.chunk_tokens,
            overlap_tokens: config.overlap_tokens,
            min_tokens: config.min_tokens,
        }
    }
}

impl ChunkingSettings {
    /// Chunker configuration.
    pub fn to_config(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_tokens: self.chunk_tokens,
            overlap_tokens: self.overlap_tokens,
            min_tokens: self.min_tokens,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Texts per embedding request.
    pub batch_size: usize,
    /// Maximum concurrent embedding requests.
    pub max_concurrent: usize,
    /// Retries for a batch that fails with a transient error.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-large".to_string(),
            dimensions: 3072,
            batch_size: 100,
            max_concurrent: 4,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

impl EmbeddingSettings {
    /// Batch dispatch options.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            batch_size: self.batch_size,
            max_concurrent: self.max_concurrent,
            max_retries: self.max_retries,
            base_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Ranked chunks to consider per query.
    pub top_k: usize,
    /// Weight of the embedding score (0 = BM25 only, 1 = embeddings only).
    pub alpha: f32,
    /// Neighbouring chunks pulled in on each side of a hit.
    pub window: usize,
    /// Token budget for each stitched block.
    pub max_tokens_per_stitch: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 30,
            alpha: 0.6,
            window: 1,
            max_tokens_per_stitch: 1000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| KnowhowError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that would otherwise fail deep inside a run.
    pub fn validate(&self) -> Result<()> {
        self.chunking.to_config().validate()?;

        if !(0.0..=1.0).contains(&self.retrieval.alpha) {
            return Err(KnowhowError::Config(format!(
                "retrieval.alpha must be between 0 and 1, got {}",
                self.retrieval.alpha
            )));
        }
        if self.embedding.batch_size == 0 {
            return Err(KnowhowError::Config("embedding.batch_size must be at least 1".to_string()));
        }
        if self.embedding.max_concurrent == 0 {
            return Err(KnowhowError::Config(
                "embedding.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.embedding.provider != "openai" {
            return Err(KnowhowError::Config(format!(
                "Unknown embedding provider: {}",
                self.embedding.provider
            )));
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("knowhow")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded transcripts directory path.
    pub fn transcripts_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.transcripts_dir)
    }
}
