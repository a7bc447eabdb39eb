//! Content API
//!
//! Read-only access to categorized markdown content.

use axum::{
    extract::{Path, State},
    Json,
};

use super::response::{ApiError, ApiResponse};
use super::AppState;
use crate::content::ContentItem;

/// `GET /content/{category}`
pub async fn list_content(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<Vec<ContentItem>>>, ApiError> {
    let items = state.content.list(&category).await?;
    Ok(ApiResponse::ok(items))
}

/// `GET /content/{category}/{slug}`
pub async fn get_content_item(
    State(state): State<AppState>,
    Path((category, slug)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ContentItem>>, ApiError> {
    let item = state.content.get(&category, &slug).await?;
    Ok(ApiResponse::ok(item))
}

/// `GET /content/tags`
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let tags = state.content.tags().await?;
    Ok(ApiResponse::ok(tags))
}
