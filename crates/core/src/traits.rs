use crate::answer::CompletionRequest;
use crate::{AnswerError, ClipboardError, IndexError};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    fn provider(&self) -> &str;

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, IndexError>;
}

#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AnswerError>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}
