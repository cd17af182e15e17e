//! HTTP-level tests for the embeddings client against a mock server.

use reelcut::config::SelectionConfig;
use reelcut::embed::{Embedder, OpenAiEmbedder, UsageBudget};
use reelcut::{FailurePolicy, HighlightEngine, ReelcutError, Transcript, TranscriptSegment};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers any embeddings request with one vector per input: inputs
/// mentioning "goal" point along x, the rest along y.
struct CountingResponder;

impl Respond for CountingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let inputs = body["input"].as_array().cloned().unwrap_or_default();
        let data: Vec<Value> = inputs
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let is_goal = text.as_str().unwrap_or_default().contains("goal");
                let embedding = if is_goal { [1.0, 0.0] } else { [0.0, 1.0] };
                json!({"object": "embedding", "index": i, "embedding": embedding})
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"object": "list", "data": data}))
    }
}

fn client(server: &MockServer) -> OpenAiEmbedder {
    OpenAiEmbedder::new("test-key".to_string())
        .with_model("test-embedding")
        .with_base_url(format!("{}/v1", server.uri()))
}

fn inputs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Client Tests
// ============================================================================

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 0, "embedding": [0.1, 0.2, 0.3]},
                    {"index": 1, "embedding": [0.4, 0.5, 0.6]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vectors = client(&server)
            .embed(&inputs(&["first", "second"]))
            .await
            .unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.4, 0.5, 0.6]);
    }

    #[tokio::test]
    async fn test_embed_restores_request_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 2, "embedding": [3.0]},
                    {"index": 0, "embedding": [1.0]},
                    {"index": 1, "embedding": [2.0]}
                ]
            })))
            .mount(&server)
            .await;

        let vectors = client(&server)
            .embed(&inputs(&["a", "b", "c"]))
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).embed(&inputs(&["x"])).await.unwrap_err();

        assert!(matches!(err, ReelcutError::Api(_)));
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_wrong_vector_count_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [1.0]}]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .embed(&inputs(&["one", "two"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ReelcutError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_budget_blocks_requests_once_spent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(CountingResponder)
            .expect(1)
            .mount(&server)
            .await;

        let budget = Arc::new(UsageBudget::new(Some(1)));
        let embedder = client(&server).with_budget(budget.clone());

        embedder.embed(&inputs(&["first"])).await.unwrap();
        let err = embedder.embed(&inputs(&["second"])).await.unwrap_err();

        assert!(matches!(err, ReelcutError::BudgetExhausted(_)));
        assert_eq!(budget.snapshot().requests, 1);
        assert_eq!(budget.remaining(), Some(0));
    }
}

// ============================================================================
// Engine Over HTTP Tests
// ============================================================================

mod engine_http_tests {
    use super::*;

    fn match_transcript() -> Transcript {
        let mut segments = Vec::new();
        let mut t = 0.0;
        while t < 300.0 {
            let text = if (150.0..170.0).contains(&t) {
                "what a goal from the striker"
            } else {
                "the ball goes back to the keeper"
            };
            segments.push(TranscriptSegment::new(t, t + 10.0, text));
            t += 10.0;
        }
        Transcript::new(segments)
    }

    #[tokio::test]
    async fn test_archetypes_embedded_once_across_videos() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(CountingResponder)
            .expect(3)
            .mount(&server)
            .await;

        let engine = HighlightEngine::new(SelectionConfig::default())
            .with_embedder(Arc::new(client(&server)));
        let transcript = match_transcript();

        let first = engine.detect(&transcript, &[], None).await.unwrap();
        let second = engine.detect(&transcript, &[], None).await.unwrap();

        assert!(!first.stats.semantic_degraded);
        assert_eq!(first.clips, second.clips);
    }

    #[tokio::test]
    async fn test_strict_policy_surfaces_outage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let engine = HighlightEngine::new(SelectionConfig::default())
            .with_embedder(Arc::new(client(&server)))
            .with_policy(FailurePolicy::Strict);

        let result = engine.detect(&match_transcript(), &[], None).await;
        assert!(matches!(result, Err(ReelcutError::Api(_))));
    }

    #[tokio::test]
    async fn test_degrade_policy_still_selects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let engine = HighlightEngine::new(SelectionConfig::default())
            .with_embedder(Arc::new(client(&server)))
            .with_policy(FailurePolicy::Degrade);

        let report = engine.detect(&match_transcript(), &[], None).await.unwrap();
        assert!(report.stats.semantic_degraded);
        assert!(!report.clips.is_empty());
    }
}
