//! GitHub showcase API

use axum::{extract::State, Json};
use serde::Serialize;

use super::response::{ApiError, ApiResponse};
use super::AppState;
use crate::github::GithubProject;

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub count: usize,
}

/// `GET /github/projects`
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<GithubProject>>>, ApiError> {
    let projects = state.github.projects().await?;
    Ok(ApiResponse::ok(projects))
}

/// `POST /admin/refresh-github`
pub async fn refresh_projects(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RefreshResult>>, ApiError> {
    let count = state.github.refresh().await?;
    Ok(ApiResponse::ok_with_message(
        RefreshResult { count },
        format!("Refreshed {} projects", count),
    ))
}
