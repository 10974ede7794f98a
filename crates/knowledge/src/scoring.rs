//! Confidence scoring over retrieved evidence.

use crate::types::SearchResult;

/// Lowest confidence reported once any evidence exists.
pub const MIN_CONFIDENCE: f32 = 0.30;

/// Highest confidence ever reported.
pub const MAX_CONFIDENCE: f32 = 0.95;

/// Mean similarity of `results`, clamped to [0.30, 0.95] and rounded to two
/// decimals. No results means no evidence: exactly `0.0`.
pub fn confidence(results: &[SearchResult]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }

    let mean = results.iter().map(|r| r.similarity).sum::<f32>() / results.len() as f32;
    if !mean.is_finite() {
        return MIN_CONFIDENCE;
    }
    let clamped = mean.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

    (clamped * 100.0).round() / 100.0
}
