use crate::embed::{ensure_vector_count, Embedder};
use crate::error::{ReelcutError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Descriptions of the kinds of moments that make good short clips. Each
/// window is compared against all of them and keeps its best match.
pub const HIGHLIGHT_ARCHETYPES: [&str; 5] = [
    "An exciting, entertaining moment perfect for YouTube Shorts with a complete story arc",
    "A surprising or shocking revelation that would grab attention and keep viewers engaged",
    "A funny or humorous moment with setup and payoff that people would want to share",
    "An educational moment explaining something valuable with clear beginning and end",
    "A dramatic or intense moment with buildup and resolution perfect for short-form content",
];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Cosine similarity with a small epsilon so zero vectors score 0 instead of NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt() + 1e-8)
}

/// Similarity of window texts to the highlight archetypes.
///
/// Archetype embeddings are fetched once and cached for the scorer's
/// lifetime, so sharing one scorer across videos costs one archetype request
/// in total plus one window request per video.
pub struct SemanticScorer {
    embedder: Arc<dyn Embedder>,
    archetypes: Vec<String>,
    archetype_vectors: OnceCell<Vec<Vec<f32>>>,
    timeout: Duration,
}

impl SemanticScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            archetypes: HIGHLIGHT_ARCHETYPES.iter().map(|s| s.to_string()).collect(),
            archetype_vectors: OnceCell::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the archetype prompts.
    pub fn with_archetypes(mut self, archetypes: Vec<String>) -> Self {
        self.archetypes = archetypes;
        self
    }

    /// Bound each embedding call; an elapsed timeout counts as a failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn archetypes(&self) -> &[String] {
        &self.archetypes
    }

    async fn embed_bounded(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = tokio::time::timeout(self.timeout, self.embedder.embed(inputs))
            .await
            .map_err(|_| {
                ReelcutError::Timeout(format!(
                    "{} did not answer within {:.0}s",
                    self.embedder.name(),
                    self.timeout.as_secs_f64()
                ))
            })??;
        ensure_vector_count(inputs.len(), &vectors)?;
        Ok(vectors)
    }

    async fn archetype_vectors(&self) -> Result<&Vec<Vec<f32>>> {
        self.archetype_vectors
            .get_or_try_init(|| async {
                info!(
                    "Embedding {} highlight archetypes with {}",
                    self.archetypes.len(),
                    self.embedder.model()
                );
                self.embed_bounded(&self.archetypes).await
            })
            .await
    }

    /// Best archetype similarity per text, clamped to `[0, 1]`.
    pub async fn similarities(&self, texts: &[String]) -> Result<Vec<f64>> {
        if texts.is_empty() || self.archetypes.is_empty() {
            return Ok(vec![0.0; texts.len()]);
        }

        let prototypes = self.archetype_vectors().await?;
        let vectors = self.embed_bounded(texts).await?;
        debug!("Embedded {} window texts", vectors.len());

        Ok(vectors
            .iter()
            .map(|v| {
                prototypes
                    .iter()
                    .map(|p| cosine_similarity(v, p))
                    .fold(f64::NEG_INFINITY, f64::max)
                    .clamp(0.0, 1.0)
            })
            .collect())
    }
}
