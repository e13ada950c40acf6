//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{KnowhowError, Result};
use crate::openai::create_client;
use async_openai::error::OpenAIError;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
///
/// Sends every `embed_batch` call as one request; splitting large jobs is left
/// to [`embed_in_batches`](super::embed_in_batches).
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config("text-embedding-3-large", 3072)
    }

    /// Create a new OpenAI embedder with custom model and dimensions.
    pub fn with_config(model: &str, dimensions: usize) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            dimensions,
        })
    }

    /// Model name used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Sort an API error into retryable or not.
fn classify(err: OpenAIError) -> KnowhowError {
    match err {
        OpenAIError::Reqwest(e) => KnowhowError::transient(format!("request failed: {}", e)),
        OpenAIError::ApiError(api) => {
            let retryable = matches!(api.r#type.as_deref(), Some("server_error"))
                || matches!(api.code.as_deref(), Some("rate_limit_exceeded"));
            let message = format!("Embedding API error: {}", api.message);
            if retryable {
                KnowhowError::transient(message)
            } else {
                KnowhowError::fatal(message)
            }
        }
        other => KnowhowError::fatal(format!("Embedding API error: {}", other)),
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| KnowhowError::fatal("Empty embedding response"))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Requesting embeddings for {} texts", texts.len());

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(texts.to_vec()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| KnowhowError::fatal(format!("Failed to build request: {}", e)))?;

        let response = self.client.embeddings().create(request).await.map_err(classify)?;

        // Sort by index to ensure correct order
        let mut data = response.data;
        data.sort_by_key(|e| e.index);

        Ok(data.into_iter().map(|e| e.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
