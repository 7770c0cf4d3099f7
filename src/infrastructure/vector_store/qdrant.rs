use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, vectors_config::Config as VectorsConfig, Condition,
    CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    GetPointsBuilder, PointId, PointStruct, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};

use crate::domain::{
    ports::VectorStore, Document, DocumentPage, DocumentPayload, DomainError, Embedding, SearchHit,
};

/// Qdrant-backed vector store. The wrapped client is a single gRPC
/// connection, safe to share across concurrent request tasks.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn point_id_num(id: &PointId) -> Option<u64> {
        match id.point_id_options {
            Some(PointIdOptions::Num(n)) => Some(n),
            _ => None,
        }
    }

    fn payload_to_qdrant(payload: &DocumentPayload) -> Result<Payload, DomainError> {
        serde_json::json!({
            "title": payload.title,
            "content": payload.content,
            "category": payload.category,
        })
        .try_into()
        .map_err(|_| DomainError::internal("failed to build point payload"))
    }

    fn payload_from_qdrant(payload: &HashMap<String, Value>) -> DocumentPayload {
        let text = |key: &str| payload.get(key).and_then(|v| v.as_str()).map(String::from);

        DocumentPayload {
            title: text("title").unwrap_or_default(),
            content: text("content").unwrap_or_default(),
            category: text("category"),
        }
    }

    /// Dimensionality of an existing collection, if it can be read from
    /// the collection config.
    async fn collection_dimension(&self, name: &str) -> Result<Option<u64>, DomainError> {
        let info = self
            .client
            .collection_info(name)
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        let size = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|vc| vc.config)
            .and_then(|cfg| match cfg {
                VectorsConfig::Params(params) => Some(params.size),
                VectorsConfig::ParamsMap(map) => map.map.into_values().next().map(|p| p.size),
            });

        Ok(size)
    }

    async fn search_inner(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        filter: Option<Filter>,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let mut builder =
            SearchPointsBuilder::new(collection, query.as_slice().to_vec(), limit as u64)
                .with_payload(true);

        if let Some(filter) = filter {
            builder = builder.filter(filter);
        }

        let results = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .filter_map(|point| {
                let id = point.id.as_ref().and_then(Self::point_id_num)?;
                Some(SearchHit {
                    id,
                    score: point.score,
                    payload: Self::payload_from_qdrant(&point.payload),
                })
            })
            .collect())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(&self, name: &str, vector_size: usize) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        let exists = collections.collections.iter().any(|c| c.name == name);

        if exists {
            // Fail loudly on a dimensionality mismatch instead of silently
            // inserting into an incompatible collection.
            if let Some(existing) = self.collection_dimension(name).await? {
                if existing != vector_size as u64 {
                    return Err(DomainError::validation(format!(
                        "collection {name} has dimension {existing}, requested {vector_size}"
                    )));
                }
            }
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
                    vector_size as u64,
                    Distance::Cosine,
                )),
            )
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(collections
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), DomainError> {
        self.client
            .delete_collection(name)
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        id: u64,
        vector: &Embedding,
        payload: &DocumentPayload,
    ) -> Result<(), DomainError> {
        let point = PointStruct::new(
            id,
            vector.as_slice().to_vec(),
            Self::payload_to_qdrant(payload)?,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, vec![point]).wait(true))
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, collection: &str, id: u64) -> Result<Option<Document>, DomainError> {
        let results = self
            .client
            .get_points(
                GetPointsBuilder::new(collection, vec![PointId::from(id)])
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(results.result.into_iter().next().and_then(|point| {
            let id = point.id.as_ref().and_then(Self::point_id_num)?;
            Some(Document::new(id, Self::payload_from_qdrant(&point.payload)))
        }))
    }

    async fn delete(&self, collection: &str, id: u64) -> Result<(), DomainError> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(vec![PointId::from(id)])
                    .wait(true),
            )
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<SearchHit>, DomainError> {
        self.search_inner(collection, query, limit, None).await
    }

    async fn search_filtered(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        category: &str,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let filter = Filter::must([Condition::matches("category", category.to_string())]);
        self.search_inner(collection, query, limit, Some(filter))
            .await
    }

    async fn scroll(
        &self,
        collection: &str,
        limit: usize,
        offset: Option<u64>,
    ) -> Result<DocumentPage, DomainError> {
        let mut builder = ScrollPointsBuilder::new(collection)
            .limit(limit as u32)
            .with_payload(true)
            .with_vectors(false);

        if let Some(offset) = offset {
            builder = builder.offset(PointId::from(offset));
        }

        let results = self
            .client
            .scroll(builder)
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        let next_offset = results
            .next_page_offset
            .as_ref()
            .and_then(Self::point_id_num);

        let documents = results
            .result
            .into_iter()
            .filter_map(|point| {
                let id = point.id.as_ref().and_then(Self::point_id_num)?;
                Some(Document::new(id, Self::payload_from_qdrant(&point.payload)))
            })
            .collect();

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
        let results = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(results.result.map(|r| r.count as usize).unwrap_or(0))
    }
}
