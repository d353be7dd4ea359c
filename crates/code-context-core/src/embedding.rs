//! Embedding provider trait and similarity math.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, plus the cosine similarity function used by the ranker.
//!
//! Concrete provider implementations (OpenAI, Ollama, disabled) live
//! in the `code-context` app crate. Providers are constructed per
//! request with a caller-supplied credential and passed down as
//! arguments — there is no process-wide provider state.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for embedding providers.
///
/// Implementations convert text into fixed-length vectors. Any
/// upstream failure (bad credential, quota, network) surfaces as an
/// error from [`embed`](EmbeddingProvider::embed); callers decide how
/// far that failure reaches (fragment-local during bulk embedding,
/// request-local at query time).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input text,
    /// in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns exactly `0.0` for empty vectors, vectors of different
/// lengths, or zero-magnitude vectors. Never divides by zero and
/// never errors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_empty() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_different_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_magnitude() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_bounds() {
        let pairs = [
            (vec![0.3, -0.7, 0.2], vec![0.9, 0.1, -0.4]),
            (vec![5.0, 5.0], vec![-3.0, 8.0]),
            (vec![1e-3, 1e-3, 1e-3], vec![1e3, -1e3, 1e3]),
        ];
        for (a, b) in &pairs {
            let sim = cosine_similarity(a, b);
            assert!(sim >= -1.0 - 1e-6 && sim <= 1.0 + 1e-6, "out of range: {}", sim);
        }
    }
}
