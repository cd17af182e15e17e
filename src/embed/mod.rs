pub mod budget;
pub mod openai;

pub use budget::{BudgetSnapshot, UsageBudget};
pub use openai::OpenAiEmbedder;

use crate::config::Config;
use crate::error::{ReelcutError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Text embedding collaborator. Implementations return exactly one vector
/// per input, in request order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
    fn name(&self) -> &str;
    fn model(&self) -> &str;
}

/// Build the configured embedder, attaching a usage budget when one is given.
pub fn create_embedder(config: &Config, budget: Option<Arc<UsageBudget>>) -> Result<Box<dyn Embedder>> {
    let api_key = config.openai_api_key.as_ref().ok_or_else(|| {
        ReelcutError::Config(
            "OpenAI API key not set. Set OPENAI_API_KEY environment variable.".to_string(),
        )
    })?;

    let mut embedder = OpenAiEmbedder::new(api_key.clone())
        .with_model(config.embedding_model.clone())
        .with_base_url(config.embedding_base_url.clone());

    if let Some(budget) = budget {
        embedder = embedder.with_budget(budget);
    }

    Ok(Box::new(embedder))
}

/// Check that a collaborator honoured the one-vector-per-input contract.
pub(crate) fn ensure_vector_count(expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
    if vectors.len() != expected {
        return Err(ReelcutError::Embedding(format!(
            "Expected {} embedding vectors, got {}",
            expected,
            vectors.len()
        )));
    }
    Ok(())
}
