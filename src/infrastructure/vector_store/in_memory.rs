use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{
    ports::VectorStore, Document, DocumentPage, DocumentPayload, DomainError, Embedding, SearchHit,
};

struct Collection {
    vector_size: usize,
    // BTreeMap gives id-ordered scans, so pagination cursors are stable.
    points: BTreeMap<u64, (Embedding, DocumentPayload)>,
}

/// In-process vector store used by tests. Read operations on an absent
/// collection behave as if the collection were empty.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, name: &str, vector_size: usize) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        if let Some(existing) = collections.get(name) {
            if existing.vector_size != vector_size {
                return Err(DomainError::validation(format!(
                    "collection {name} has dimension {}, requested {vector_size}",
                    existing.vector_size
                )));
            }
            return Ok(());
        }

        collections.insert(
            name.to_string(),
            Collection {
                vector_size,
                points: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(collections.keys().cloned().collect())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        collections.remove(name);
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        id: u64,
        vector: &Embedding,
        payload: &DocumentPayload,
    ) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| DomainError::store(format!("collection {collection} not found")))?;

        entry.points.insert(id, (vector.clone(), payload.clone()));
        Ok(())
    }

    async fn get(&self, collection: &str, id: u64) -> Result<Option<Document>, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(collections.get(collection).and_then(|c| {
            c.points
                .get(&id)
                .map(|(_, payload)| Document::new(id, payload.clone()))
        }))
    }

    async fn delete(&self, collection: &str, id: u64) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        if let Some(entry) = collections.get_mut(collection) {
            entry.points.remove(&id);
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<SearchHit>, DomainError> {
        self.rank(collection, query, limit, None)
    }

    async fn search_filtered(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        category: &str,
    ) -> Result<Vec<SearchHit>, DomainError> {
        self.rank(collection, query, limit, Some(category))
    }

    async fn scroll(
        &self,
        collection: &str,
        limit: usize,
        offset: Option<u64>,
    ) -> Result<DocumentPage, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let Some(entry) = collections.get(collection) else {
            return Ok(DocumentPage {
                documents: Vec::new(),
                next_offset: None,
            });
        };

        let start = offset.unwrap_or(0);
        let documents: Vec<Document> = entry
            .points
            .range(start..)
            .take(limit)
            .map(|(id, (_, payload))| Document::new(*id, payload.clone()))
            .collect();

        let next_offset = entry
            .points
            .range(start..)
            .nth(limit)
            .map(|(id, _)| *id);

        Ok(DocumentPage {
            documents,
            next_offset,
        })
    }

    async fn scroll_all(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Document>, DomainError> {
        let page = self.scroll(collection, limit, None).await?;
        Ok(page.documents)
    }

    async fn count(&self, collection: &str) -> Result<usize, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(collections
            .get(collection)
            .map(|c| c.points.len())
            .unwrap_or(0))
    }
}

impl InMemoryVectorStore {
    fn rank(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let Some(entry) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<SearchHit> = entry
            .points
            .iter()
            .filter(|(_, (_, payload))| match category {
                Some(wanted) => payload.category.as_deref() == Some(wanted),
                None => true,
            })
            .map(|(id, (vector, payload))| SearchHit {
                id: *id,
                score: query.cosine_similarity(vector),
                payload: payload.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str, category: Option<&str>) -> DocumentPayload {
        DocumentPayload::new(title, format!("{title} content"), category.map(String::from))
    }

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("kb", 3).await.unwrap();
        store.ensure_collection("kb", 3).await.unwrap();

        assert_eq!(store.list_collections().await.unwrap(), vec!["kb"]);
    }

    #[tokio::test]
    async fn test_ensure_collection_rejects_dimension_mismatch() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("kb", 3).await.unwrap();

        let err = store.ensure_collection("kb", 4).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("kb", 2).await.unwrap();

        let vector = Embedding::new(vec![1.0, 0.0]);
        store
            .upsert("kb", 1, &vector, &payload("old", None))
            .await
            .unwrap();
        store
            .upsert("kb", 1, &vector, &payload("new", None))
            .await
            .unwrap();

        assert_eq!(store.count("kb").await.unwrap(), 1);
        let doc = store.get("kb", 1).await.unwrap().unwrap();
        assert_eq!(doc.payload.title, "new");
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("kb", 2).await.unwrap();

        store
            .upsert("kb", 1, &Embedding::new(vec![1.0, 0.0]), &payload("a", None))
            .await
            .unwrap();
        store
            .upsert("kb", 2, &Embedding::new(vec![0.0, 1.0]), &payload("b", None))
            .await
            .unwrap();

        let hits = store
            .search("kb", &Embedding::new(vec![1.0, 0.1]), 2)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1);
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_filtered_search_restricts_category() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("kb", 2).await.unwrap();

        let vector = Embedding::new(vec![1.0, 0.0]);
        store
            .upsert("kb", 1, &vector, &payload("a", Some("x")))
            .await
            .unwrap();
        store
            .upsert("kb", 2, &vector, &payload("b", Some("y")))
            .await
            .unwrap();

        let hits = store.search_filtered("kb", &vector, 10, "x").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[tokio::test]
    async fn test_scroll_pages_through_all_points() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("kb", 2).await.unwrap();

        let vector = Embedding::new(vec![1.0, 0.0]);
        for id in 1..=5 {
            store
                .upsert("kb", id, &vector, &payload("t", None))
                .await
                .unwrap();
        }

        let first = store.scroll("kb", 2, None).await.unwrap();
        assert_eq!(first.documents.len(), 2);
        assert_eq!(first.next_offset, Some(3));

        let second = store.scroll("kb", 2, first.next_offset).await.unwrap();
        assert_eq!(second.documents.len(), 2);
        assert_eq!(second.next_offset, Some(5));

        let last = store.scroll("kb", 2, second.next_offset).await.unwrap();
        assert_eq!(last.documents.len(), 1);
        assert_eq!(last.next_offset, None);
    }

    #[tokio::test]
    async fn test_reads_on_absent_collection_are_empty() {
        let store = InMemoryVectorStore::new();

        assert!(store.get("none", 1).await.unwrap().is_none());
        assert_eq!(store.count("none").await.unwrap(), 0);
        assert!(store
            .search("none", &Embedding::new(vec![1.0]), 5)
            .await
            .unwrap()
            .is_empty());
    }
}
