use crate::config::{ChatModel, Temperature};
use crate::traits::AnswerService;
use crate::AnswerError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: ChatModel,
    pub temperature: Temperature,
    pub prompt: String,
}

/// One-shot chat completion client for the Groq OpenAI-compatible API.
/// The prompt travels as a single user message; failures are not retried.
pub struct GroqChatClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl GroqChatClient {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
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
impl AnswerService for GroqChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AnswerError> {
        let endpoint = self.base_url.join("chat/completions")?;
        debug!(model = %request.model, prompt_chars = request.prompt.len(), "requesting completion");

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: request.model.id(),
                temperature: request.temperature.get(),
                messages: [ChatMessage {
                    role: "user",
                    content: &request.prompt,
                }],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|error| error.error.message)
                .unwrap_or(body);
            return Err(AnswerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ChatResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AnswerError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GroqChatClient {
        let base = Url::parse(&format!("{}/openai/v1/", server.uri())).expect("mock uri parses");
        GroqChatClient::new(base, "gsk-test")
    }

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: ChatModel::Llama33Versatile,
            temperature: Temperature::new(0.5).expect("in range"),
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn sends_prompt_as_single_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(bearer_token("gsk-test"))
            .and(body_json(json!({
                "model": "llama-3.3-70b-versatile",
                "temperature": 0.5,
                "messages": [{ "role": "user", "content": "Context:\nx" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Revenue rose." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client(&server).complete(&request("Context:\nx")).await.unwrap();
        assert_eq!(answer, "Revenue rose.");
    }

    #[tokio::test]
    async fn rate_limits_surface_once_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit reached for model" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let error = client(&server).complete(&request("q")).await.unwrap_err();
        assert!(matches!(error, AnswerError::Api { status: 429, .. }));
        assert!(error.to_string().contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let error = client(&server).complete(&request("q")).await.unwrap_err();
        assert!(matches!(error, AnswerError::EmptyResponse));
    }
}
