//! Embedding generation for knowledge bases.
//!
//! Provides provider-agnostic embedding with per-collection configuration.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use pqrs_core::{AppError, AppResult};

/// Embed `texts` in batches no larger than the provider's `max_batch_size`.
///
/// Returns one vector per input, in input order. A provider that returns
/// the wrong number of vectors or the wrong dimensionality is an error.
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let batch_size = provider.max_batch_size().max(1);
    let mut embeddings = Vec::with_capacity(texts.len());

    tracing::debug!(
        "Embedding {} texts using provider '{}' (model: {}, batch size: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name(),
        batch_size
    );

    for batch in texts.chunks(batch_size) {
        let vectors = provider.embed_batch(batch).await?;

        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned {} embeddings for {} texts",
                provider.provider_name(),
                vectors.len(),
                batch.len()
            )));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != provider.dimensions()) {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned a {}-dimensional vector, expected {}",
                provider.provider_name(),
                bad.len(),
                provider.dimensions()
            )));
        }

        embeddings.extend(vectors);
    }

    Ok(embeddings)
}
