use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::{Document, DocumentPayload, SearchHit};

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl DocumentRequest {
    fn into_payload(self) -> DocumentPayload {
        DocumentPayload::new(self.title, self.content, self.category)
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: u64,
    pub payload: DocumentPayload,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            payload: doc.payload,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: Option<u64>,
}

fn default_page_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub documents: Vec<DocumentResponse>,
    pub next_offset: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct FilterSearchRequest {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    pub category: String,
}

fn default_search_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct SearchHitResponse {
    pub id: u64,
    pub score: f32,
    pub payload: DocumentPayload,
}

impl From<SearchHit> for SearchHitResponse {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.id,
            score: hit.score,
            payload: hit.payload,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHitResponse>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub collection: String,
    pub total_documents: usize,
    pub vector_dimension: usize,
    pub categories: HashMap<String, usize>,
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let doc = Document::new(request.id, request.into_payload());
    state.documents.create(doc).await?;

    Ok(Json(StatusResponse::success("Document stored successfully")))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let doc = state.documents.get(id).await?;
    Ok(Json(DocumentResponse::from(doc)))
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    // The path id is authoritative; the body id is ignored.
    state.documents.update(id, request.into_payload()).await?;

    Ok(Json(StatusResponse::success(format!(
        "Document with id {id} updated successfully"
    ))))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.documents.delete(id).await?;

    Ok(Json(StatusResponse::success(format!(
        "Document with id {id} deleted successfully"
    ))))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let page = state.documents.list(query.limit, query.offset).await?;

    Ok(Json(ListResponse {
        documents: page
            .documents
            .into_iter()
            .map(DocumentResponse::from)
            .collect(),
        next_offset: page.next_offset,
    }))
}

pub async fn search_documents(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let hits = state
        .documents
        .search(&request.query, request.limit)
        .await?;

    Ok(Json(SearchResponse {
        results: hits.into_iter().map(SearchHitResponse::from).collect(),
    }))
}

pub async fn filtered_search(
    State(state): State<AppState>,
    Json(request): Json<FilterSearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let hits = state
        .documents
        .search_filtered(&request.query, request.limit, &request.category)
        .await?;

    Ok(Json(SearchResponse {
        results: hits.into_iter().map(SearchHitResponse::from).collect(),
    }))
}

pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.documents.stats().await?;

    Ok(Json(StatsResponse {
        collection: stats.collection,
        total_documents: stats.total_documents,
        vector_dimension: stats.vector_dimension,
        categories: stats.categories,
    }))
}
