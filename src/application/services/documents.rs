use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    Document, DocumentPage, DocumentPayload, DomainError, SearchHit,
};

/// Row cap for the unpaginated scan behind `stats`. Category counts only
/// reflect documents within this bound; `total_documents` stays exact.
const STATS_SCAN_LIMIT: usize = 1000;

/// Aggregate view over the document collection.
#[derive(Debug, Clone)]
pub struct CollectionStats {
    pub collection: String,
    pub total_documents: usize,
    pub vector_dimension: usize,
    pub categories: HashMap<String, usize>,
}

/// Document-management façade: coordinates embedding generation with the
/// vector store. The target collection and its vector size are fixed at
/// construction; the collection itself is created lazily on first insert.
pub struct DocumentService {
    embedding: Arc<dyn EmbeddingService>,
    store: Arc<dyn VectorStore>,
    collection: String,
    vector_size: usize,
}

impl DocumentService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        vector_size: usize,
    ) -> Self {
        Self {
            embedding,
            store,
            collection: collection.into(),
            vector_size,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Store a document. An existing id is silently overwritten.
    #[instrument(skip(self, doc), fields(id = doc.id))]
    pub async fn create(&self, doc: Document) -> Result<(), DomainError> {
        self.store
            .ensure_collection(&self.collection, self.vector_size)
            .await?;

        let vector = self.embedding.embed(&doc.payload.content).await?;
        self.store
            .upsert(&self.collection, doc.id, &vector, &doc.payload)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: u64) -> Result<Document, DomainError> {
        self.store
            .get(&self.collection, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Document with id {id} not found")))
    }

    /// Full-replace update: the entire payload is re-supplied and the
    /// content is re-embedded. A missing id is an error, not an insert.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: u64, payload: DocumentPayload) -> Result<(), DomainError> {
        if self.store.get(&self.collection, id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Document with id {id} not found"
            )));
        }

        let vector = self.embedding.embed(&payload.content).await?;
        self.store
            .upsert(&self.collection, id, &vector, &payload)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), DomainError> {
        if self.store.get(&self.collection, id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Document with id {id} not found"
            )));
        }

        self.store.delete(&self.collection, id).await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        limit: usize,
        offset: Option<u64>,
    ) -> Result<DocumentPage, DomainError> {
        self.store.scroll(&self.collection, limit, offset).await
    }

    #[instrument(skip(self, query))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, DomainError> {
        let vector = self.embedding.embed(query).await?;
        self.store.search(&self.collection, &vector, limit).await
    }

    #[instrument(skip(self, query))]
    pub async fn search_filtered(
        &self,
        query: &str,
        limit: usize,
        category: &str,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let vector = self.embedding.embed(query).await?;
        self.store
            .search_filtered(&self.collection, &vector, limit, category)
            .await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        self.store.list_collections().await
    }

    #[instrument(skip(self))]
    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: usize,
    ) -> Result<(), DomainError> {
        let existing = self.store.list_collections().await?;
        if existing.iter().any(|c| c == name) {
            return Err(DomainError::conflict(format!(
                "Collection {name} already exists"
            )));
        }

        self.store.ensure_collection(name, vector_size).await
    }

    #[instrument(skip(self))]
    pub async fn delete_collection(&self, name: &str) -> Result<(), DomainError> {
        let existing = self.store.list_collections().await?;
        if !existing.iter().any(|c| c == name) {
            return Err(DomainError::not_found(format!(
                "Collection {name} not found"
            )));
        }

        self.store.delete_collection(name).await
    }

    /// Exact total count plus a category histogram. Documents without a
    /// category land in the `"unknown"` bucket.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<CollectionStats, DomainError> {
        let total = self.store.count(&self.collection).await?;
        let documents = self
            .store
            .scroll_all(&self.collection, STATS_SCAN_LIMIT)
            .await?;

        let mut categories: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let bucket = doc
                .payload
                .category
                .unwrap_or_else(|| "unknown".to_string());
            *categories.entry(bucket).or_default() += 1;
        }

        Ok(CollectionStats {
            collection: self.collection.clone(),
            total_documents: total,
            vector_dimension: self.vector_size,
            categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Embedding;
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;

    struct StubEmbedding {
        dimension: usize,
    }

    #[async_trait]
    impl EmbeddingService for StubEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            let mut vec = vec![0.0f32; self.dimension];
            for (i, byte) in text.bytes().enumerate() {
                vec[i % self.dimension] += byte as f32;
            }
            Ok(Embedding::new(vec))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    fn service() -> DocumentService {
        DocumentService::new(
            Arc::new(StubEmbedding { dimension: 4 }),
            Arc::new(InMemoryVectorStore::new()),
            "kb_test",
            4,
        )
    }

    fn doc(id: u64, title: &str, content: &str, category: Option<&str>) -> Document {
        Document::new(
            id,
            DocumentPayload::new(title, content, category.map(String::from)),
        )
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrips() {
        let svc = service();
        svc.create(doc(1, "First", "hello world", Some("greeting")))
            .await
            .unwrap();

        let fetched = svc.get(1).await.unwrap();
        assert_eq!(fetched.payload.title, "First");
        assert_eq!(fetched.payload.content, "hello world");
        assert_eq!(fetched.payload.category.as_deref(), Some("greeting"));
    }

    #[tokio::test]
    async fn test_create_overwrites_existing_id() {
        let svc = service();
        svc.create(doc(1, "Old", "old content", None)).await.unwrap();
        svc.create(doc(1, "New", "new content", None)).await.unwrap();

        let fetched = svc.get(1).await.unwrap();
        assert_eq!(fetched.payload.title, "New");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let svc = service();
        svc.create(doc(1, "T", "c", None)).await.unwrap();

        let err = svc.get(42).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let svc = service();
        svc.create(doc(7, "T", "c", None)).await.unwrap();

        svc.delete(7).await.unwrap();
        assert!(matches!(
            svc.get(7).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_update_missing_id_does_not_insert() {
        let svc = service();
        svc.create(doc(1, "T", "c", None)).await.unwrap();

        let err = svc
            .update(99, DocumentPayload::new("X", "y", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(matches!(
            svc.get(99).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_full_payload() {
        let svc = service();
        svc.create(doc(3, "Before", "old", Some("a"))).await.unwrap();

        svc.update(3, DocumentPayload::new("After", "new", None))
            .await
            .unwrap();

        let fetched = svc.get(3).await.unwrap();
        assert_eq!(fetched.payload.title, "After");
        assert_eq!(fetched.payload.content, "new");
        assert_eq!(fetched.payload.category, None);
    }

    #[tokio::test]
    async fn test_search_empty_collection_returns_empty() {
        let svc = service();
        let results = svc.search("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_filtered_search_only_matching_category() {
        let svc = service();
        svc.create(doc(1, "A", "rust systems", Some("tech")))
            .await
            .unwrap();
        svc.create(doc(2, "B", "rust web", Some("tech"))).await.unwrap();
        svc.create(doc(3, "C", "cooking pasta", Some("food")))
            .await
            .unwrap();

        let results = svc.search_filtered("rust", 10, "tech").await.unwrap();
        assert!(!results.is_empty());
        for hit in results {
            assert_eq!(hit.payload.category.as_deref(), Some("tech"));
        }
    }

    #[tokio::test]
    async fn test_pagination_covers_all_ids() {
        let svc = service();
        for id in 1..=5 {
            svc.create(doc(id, "T", "content", None)).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut offset = None;
        loop {
            let page = svc.list(2, offset).await.unwrap();
            seen.extend(page.documents.iter().map(|d| d.id));
            match page.next_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_create_collection_conflict() {
        let svc = service();
        svc.create_collection("foo", 128).await.unwrap();

        let err = svc.create_collection("foo", 128).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_collection_is_not_found() {
        let svc = service();
        let err = svc.delete_collection("nope").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stats_buckets_missing_category_as_unknown() {
        let svc = service();
        svc.create(doc(1, "A", "x", Some("tech"))).await.unwrap();
        svc.create(doc(2, "B", "y", Some("tech"))).await.unwrap();
        svc.create(doc(3, "C", "z", None)).await.unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(stats.collection, "kb_test");
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.vector_dimension, 4);
        assert_eq!(stats.categories.get("tech"), Some(&2));
        assert_eq!(stats.categories.get("unknown"), Some(&1));
    }
}
