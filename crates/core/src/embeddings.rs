use crate::traits::EmbeddingService;
use crate::IndexError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_EMBEDDING_BATCH: usize = 512;

const PROVIDER: &str = "openai";

/// Client for an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbeddings {
    client: Client,
    base_url: Url,
    api_key: String,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbeddings {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            batch_size: DEFAULT_EMBEDDING_BATCH,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn request_batch(&self, input: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
        let endpoint = self.base_url.join("embeddings")?;
        debug!(provider = PROVIDER, batch_size = input.len(), model = %self.model, "embedding batch");

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|error| error.error.message)
                .unwrap_or(body);
            return Err(IndexError::Embedding {
                provider: PROVIDER.to_string(),
                message: format!("{status}: {detail}"),
            });
        }

        let mut payload: EmbeddingResponse = response.json().await?;
        payload.data.sort_by_key(|item| item.index);

        if payload.data.len() != input.len() {
            return Err(IndexError::CountMismatch {
                chunks: input.len(),
                embeddings: payload.data.len(),
            });
        }

        Ok(payload.data.into_iter().map(|item| item.embedding).collect())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddings {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.request_batch(batch).await?);
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        self.request_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(IndexError::CountMismatch {
                chunks: 1,
                embeddings: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base(server: &MockServer) -> Url {
        Url::parse(&format!("{}/v1/", server.uri())).expect("mock uri parses")
    }

    #[tokio::test]
    async fn embeddings_are_returned_in_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(json!({ "model": DEFAULT_EMBEDDING_MODEL })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] }
                ]
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbeddings::new(base(&server), "sk-test");
        let vectors = embedder
            .embed_documents(&["revenue".to_string(), "expenses".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn large_inputs_are_sent_in_batches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "index": 0, "embedding": [0.5] },
                    { "index": 1, "embedding": [0.5] }
                ]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let embedder = OpenAiEmbeddings::new(base(&server), "sk-test").with_batch_size(2);
        let texts: Vec<String> = (0..4).map(|i| format!("chunk {i}")).collect();
        let vectors = embedder.embed_documents(&texts).await.unwrap();

        assert_eq!(vectors.len(), 4);
    }

    #[tokio::test]
    async fn api_errors_carry_the_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "You exceeded your current quota" }
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbeddings::new(base(&server), "sk-test");
        let error = embedder.embed_query("revenue").await.unwrap_err();

        match error {
            IndexError::Embedding { provider, message } => {
                assert_eq!(provider, "openai");
                assert!(message.contains("429"));
                assert!(message.contains("exceeded your current quota"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
