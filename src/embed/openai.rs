use crate::config::{DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL};
use crate::embed::{ensure_vector_count, Embedder, UsageBudget};
use crate::error::{ReelcutError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum retries for API calls.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 1000;

/// OpenAI-compatible embeddings client. All inputs of one `embed` call go
/// out in a single request.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    budget: Option<Arc<UsageBudget>>,
}

impl OpenAiEmbedder {
    /// Create a new client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: DEFAULT_EMBEDDING_URL.to_string(),
            budget: None,
        }
    }

    /// Set the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Charge every request against a usage budget.
    pub fn with_budget(mut self, budget: Arc<UsageBudget>) -> Self {
        self.budget = Some(budget);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    async fn call_api(&self, inputs: &[String]) -> Result<EmbeddingResponse> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Embeddings API response status: {}", status);

        if status.is_success() {
            let body = response.text().await?;
            let parsed: EmbeddingResponse = serde_json::from_str(&body)?;
            return Ok(parsed);
        }

        let error_body = response.text().await.unwrap_or_default();

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
            return Err(ReelcutError::Api(format!(
                "Embeddings API error ({}): {} ({})",
                status.as_u16(),
                api_error.error.message,
                api_error.error.r#type.unwrap_or_default()
            )));
        }

        Err(ReelcutError::Api(format!(
            "Embeddings API error ({}): {}",
            status.as_u16(),
            error_body
        )))
    }

    async fn embed_with_retry(&self, inputs: &[String]) -> Result<EmbeddingResponse> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms delay", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            if let Some(budget) = &self.budget {
                budget.try_acquire(inputs.len())?;
            }

            match self.call_api(inputs).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    // Client errors other than rate limiting won't improve on retry
                    let error_str = e.to_string();
                    if error_str.contains("API error (4") && !error_str.contains("API error (429") {
                        return Err(e);
                    }
                    warn!("Embedding attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ReelcutError::Api("Unknown error".to_string())))
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(vec![]);
        }

        debug!("Embedding {} input(s) with {}", inputs.len(), self.model);

        let response = self.embed_with_retry(inputs).await?;
        let vectors = response.into_vectors();
        ensure_vector_count(inputs.len(), &vectors)?;

        Ok(vectors)
    }

    fn name(&self) -> &str {
        "OpenAI Embeddings"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// API request/response types

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors in request order; the API reports an index per item.
    fn into_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|item| item.index);
        self.data.into_iter().map(|item| item.embedding).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: Option<String>,
}
