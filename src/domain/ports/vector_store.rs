use crate::domain::{
    errors::DomainError, Document, DocumentPage, DocumentPayload, Embedding, SearchHit,
};
use async_trait::async_trait;

/// Thin translation layer over the external vector database. All durable
/// state lives behind this trait; the façade above it holds none.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create `name` with cosine distance and the given size if absent.
    /// When the collection already exists its dimensionality must match
    /// `vector_size`; a mismatch is a `Validation` error.
    async fn ensure_collection(&self, name: &str, vector_size: usize) -> Result<(), DomainError>;

    async fn list_collections(&self) -> Result<Vec<String>, DomainError>;

    async fn delete_collection(&self, name: &str) -> Result<(), DomainError>;

    /// Insert-or-replace a single point. Last writer wins; no versioning.
    async fn upsert(
        &self,
        collection: &str,
        id: u64,
        vector: &Embedding,
        payload: &DocumentPayload,
    ) -> Result<(), DomainError>;

    /// Indexed point lookup by id.
    async fn get(&self, collection: &str, id: u64) -> Result<Option<Document>, DomainError>;

    /// Delete a single point by id. Deleting an absent id is not an error.
    async fn delete(&self, collection: &str, id: u64) -> Result<(), DomainError>;

    /// Top-`limit` nearest points by cosine similarity. An empty collection
    /// yields an empty list, never an error.
    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<SearchHit>, DomainError>;

    /// Same as `search`, restricted to points whose payload `category`
    /// equals the given value. The filter is applied inside the store.
    async fn search_filtered(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        category: &str,
    ) -> Result<Vec<SearchHit>, DomainError>;

    /// One page of a scan plus the cursor for the next page. Ordering
    /// stability across pages is delegated to the store and best-effort.
    async fn scroll(
        &self,
        collection: &str,
        limit: usize,
        offset: Option<u64>,
    ) -> Result<DocumentPage, DomainError>;

    /// Unpaginated scan capped at `limit` rows, used by the stats path.
    /// Documents beyond the cap are not represented in the result.
    async fn scroll_all(&self, collection: &str, limit: usize)
        -> Result<Vec<Document>, DomainError>;

    /// Exact point count.
    async fn count(&self, collection: &str) -> Result<usize, DomainError>;
}
