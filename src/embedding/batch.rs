//! Ordered, concurrent batch embedding with bounded retry.

use super::Embedder;
use crate::error::{KnowhowError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// How to split and dispatch an embedding job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Texts per provider call.
    pub batch_size: usize,
    /// Batches in flight at once.
    pub max_concurrent: usize,
    /// Extra attempts for a batch that fails with a transient error.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_backoff: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_concurrent: 4,
            max_retries: 3,
            base_backoff: Duration::from_millis(500),
        }
    }
}

/// Embed `texts` in batches, returning one vector per text in input order.
///
/// Up to `max_concurrent` batches run at once, but results are reassembled by
/// batch position rather than completion order. Any batch that still fails
/// after its retries fails the whole job.
#[instrument(skip(embedder, texts, options), fields(count = texts.len()))]
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: &[String],
    options: &BatchOptions,
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let batch_size = options.batch_size.max(1);
    let batches: Vec<Vec<Vec<f32>>> = stream::iter(texts.chunks(batch_size).enumerate())
        .map(|(batch, chunk)| embed_with_retry(embedder, batch, chunk, options))
        .buffered(options.max_concurrent.max(1))
        .try_collect()
        .await?;

    let embeddings: Vec<Vec<f32>> = batches.into_iter().flatten().collect();
    debug!(
        "Generated {} embeddings in {} batches",
        embeddings.len(),
        texts.len().div_ceil(batch_size)
    );
    Ok(embeddings)
}

async fn embed_with_retry(
    embedder: &dyn Embedder,
    batch: usize,
    texts: &[String],
    options: &BatchOptions,
) -> Result<Vec<Vec<f32>>> {
    retry_transient(options, &format!("batch {}", batch), move || async move {
        let vectors = embedder.embed_batch(texts).await?;
        check_shape(&vectors, texts.len(), embedder.dimensions())?;
        Ok(vectors)
    })
    .await
    .map_err(|(attempts, e)| KnowhowError::EmbeddingBatch {
        batch,
        attempts,
        source: Box::new(e),
    })
}

/// Embed a single query text, retrying transient failures like a batch.
#[instrument(skip(embedder, text, options))]
pub async fn embed_query(
    embedder: &dyn Embedder,
    text: &str,
    options: &BatchOptions,
) -> Result<Vec<f32>> {
    retry_transient(options, "query", move || async move {
        let vector = embedder.embed(text).await?;
        check_shape(std::slice::from_ref(&vector), 1, embedder.dimensions())?;
        Ok(vector)
    })
    .await
    .map_err(|(attempts, e)| KnowhowError::EmbeddingQuery {
        attempts,
        source: Box::new(e),
    })
}

/// Run `call` until it succeeds, fails fatally, or runs out of retries.
///
/// On failure returns the number of attempts made and the last error.
async fn retry_transient<T, F, Fut>(
    options: &BatchOptions,
    label: &str,
    mut call: F,
) -> std::result::Result<T, (u32, KnowhowError)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt <= options.max_retries => {
                let delay = backoff(options.base_backoff, attempt);
                warn!(
                    "Embedding {} failed: {}; retrying in {}ms ({}/{})",
                    label,
                    e,
                    delay.as_millis(),
                    attempt,
                    options.max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err((attempt, e)),
        }
    }
}

/// Reject responses with the wrong number of vectors or the wrong width.
fn check_shape(vectors: &[Vec<f32>], expected: usize, dimensions: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(KnowhowError::fatal(format!(
            "provider returned {} vectors for {} texts",
            vectors.len(),
            expected
        )));
    }
    if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dimensions) {
        return Err(KnowhowError::fatal(format!(
            "vector {} has {} dimensions, expected {}",
            i,
            v.len(),
            dimensions
        )));
    }
    Ok(())
}

/// Exponential backoff for the given 1-based retry number.
fn backoff(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(1u32 << retry.saturating_sub(1).min(16))
}
