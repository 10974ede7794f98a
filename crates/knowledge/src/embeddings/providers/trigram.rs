//! Trigram embedding provider using hashed words and character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use pqrs_core::AppResult;
use std::collections::HashMap;

/// Words too common in Spanish infrastructure text to carry signal.
const STOP_WORDS: [&str; 40] = [
    "el", "la", "los", "las", "un", "una", "unos", "unas", "de", "del", "al", "en", "y", "o",
    "que", "por", "para", "con", "sin", "se", "su", "sus", "es", "son", "lo", "como", "más",
    "pero", "este", "esta", "estos", "estas", "the", "and", "for", "with", "from", "this",
    "that", "are",
];

/// Trigram-based embedding provider for local, offline operation.
///
/// Deterministic and content-dependent: identical text always maps to the
/// identical unit vector. Not a semantic model, but good enough for
/// development, tests and air-gapped deployments.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
    batch_size: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions (at least 1).
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            batch_size: 64,
        }
    }

    /// Set the maximum batch size reported to callers.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn bucket(&self, token: &str, seed: u64) -> usize {
        let hash = token
            .bytes()
            .fold(seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let freq = *freq as f32;
            embedding[self.bucket(word, 7)] += freq;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(&trigram, 13)] += freq.sqrt();
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.generate(text)).collect())
    }
}
