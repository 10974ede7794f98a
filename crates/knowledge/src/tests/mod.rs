//! Scenario tests and shared test doubles.

mod rag_ranking;

use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use pqrs_core::{AppError, AppResult};
use pqrs_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Text-generation double that replies with fixed text (or always fails)
/// and records every request.
pub(crate) struct ScriptedLlm {
    reply: Option<String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            Some(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 5),
            }),
            None => Err(AppError::Llm("connection refused".to_string())),
        }
    }
}

/// Embedder that succeeds for a fixed number of batch calls, then fails.
///
/// Batches hold one text, so each call embeds a single chunk.
#[derive(Debug)]
pub(crate) struct FailingEmbedder {
    inner: TrigramProvider,
    remaining: AtomicUsize,
}

impl FailingEmbedder {
    pub(crate) fn new(successful_calls: usize) -> Self {
        Self {
            inner: TrigramProvider::new(32),
            remaining: AtomicUsize::new(successful_calls),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "failing-v1"
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn max_batch_size(&self) -> usize {
        1
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if allowed {
            self.inner.embed_batch(texts).await
        } else {
            Err(AppError::Embedding("embedding service unreachable".to_string()))
        }
    }
}
