use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Text-to-vector provider. `dimension` is stable for the process lifetime;
/// batch output preserves input order. Failures surface as
/// `DomainError::Embedding` and are not retried at this layer.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
}
