//! The embedding boundary and the vector math the stores share.
//!
//! Providers (Gemini, OpenAI, Ollama, fastembed) live in the app crate;
//! this module only fixes their shape. Vectors are persisted as packed
//! little-endian `f32` bytes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Turns text into fixed-length vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier recorded next to every stored vector.
    fn model_name(&self) -> &str;
    /// Length of every vector this provider returns.
    fn dims(&self) -> usize;
    /// One vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed a single query text.
pub async fn embed_one(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    let mut vectors = provider.embed(&[text.to_string()]).await?;
    if vectors.is_empty() {
        return Err(anyhow!(
            "{} returned no vector for the query",
            provider.model_name()
        ));
    }
    Ok(vectors.swap_remove(0))
}

/// Pack a vector for storage in a BLOB column.
///
/// ```rust
/// use onboarding_core::embedding::{blob_to_vec, vec_to_blob};
///
/// let v = vec![0.5f32, -1.0];
/// assert_eq!(vec_to_blob(&v).len(), 8);
/// assert_eq!(blob_to_vec(&vec_to_blob(&v)), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Inverse of [`vec_to_blob`]. Trailing bytes that do not form a whole
/// `f32` are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Cosine similarity of two vectors, or `0.0` when it is undefined
/// (different lengths, empty input, or a zero vector).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = (norm_a * norm_b).sqrt();
    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
