use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::routes::documents::StatusResponse;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionQuery {
    pub collection_name: String,
    pub vector_size: usize,
}

pub async fn list_collections(
    State(state): State<AppState>,
) -> Result<Json<CollectionsResponse>, ApiError> {
    let collections = state.documents.list_collections().await?;
    Ok(Json(CollectionsResponse { collections }))
}

pub async fn create_collection(
    State(state): State<AppState>,
    Query(query): Query<CreateCollectionQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .documents
        .create_collection(&query.collection_name, query.vector_size)
        .await?;

    Ok(Json(StatusResponse::success(format!(
        "Collection {} created successfully",
        query.collection_name
    ))))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Path(collection_name): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.documents.delete_collection(&collection_name).await?;

    Ok(Json(StatusResponse::success(format!(
        "{collection_name} deleted successfully"
    ))))
}
