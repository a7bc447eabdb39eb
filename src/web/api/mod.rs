//! Portfolio API Endpoints
//!
//! Routes (nested under `/api`):
//! - GET /health, /healthz, /readyz
//! - /auth/* (see `crate::web::auth`)
//! - GET /content/tags, /content/{category}, /content/{category}/{slug}
//! - GET /github/projects
//! - POST /admin/refresh-github (auth)
//! - /admin/files/* (auth)

pub mod content;
pub mod files;
pub mod github;
pub mod health;
pub mod response;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::content::ContentStore;
use crate::files::FileStore;
use crate::github::{GithubApiSource, GithubCatalog, RepoSource};
use crate::web::auth::{auth_router, require_auth, AuthState};

pub use health::HealthState;
pub use response::{ApiError, ApiResponse};

/// Shared state for every API handler
#[derive(Clone)]
pub struct AppState {
    pub files: FileStore,
    pub content: ContentStore,
    pub github: GithubCatalog,
    pub auth: Arc<AuthState>,
    pub health: Arc<HealthState>,
}

impl AppState {
    /// Build state backed by the live GitHub API
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = Arc::new(GithubApiSource::new(
            config.github_api_url.clone(),
            config.github_token.clone(),
        ));
        Self::with_source(config, source).await
    }

    /// Build state with an explicit repository source
    pub async fn with_source(config: &Config, source: Arc<dyn RepoSource>) -> anyhow::Result<Self> {
        let files = FileStore::open(&config.content_path).await?;
        let content = ContentStore::new(
            files.root().to_path_buf(),
            Duration::from_secs(config.content_cache_ttl_secs),
        );
        let github = GithubCatalog::new(
            config.github_config_path(),
            source,
            Duration::from_secs(config.github_cache_ttl_secs),
        );
        let auth = Arc::new(AuthState::from_config(config)?);

        Ok(Self {
            files,
            content,
            github,
            auth,
            health: Arc::new(HealthState::new()),
        })
    }
}

/// Admin file routes, mounted at `/admin/files`
fn files_router() -> Router<AppState> {
    Router::new()
        .route("/list", get(files::list_root))
        .route("/list/", get(files::list_root))
        .route("/list/{*path}", get(files::list_path))
        .route("/read/{*path}", get(files::read_file))
        .route("/save/{*path}", post(files::save_file))
        .route("/delete", post(files::delete_path))
        .route("/rename", post(files::rename_path))
        .route("/move", post(files::move_path))
        .route("/create-folder", post(files::create_folder))
        .route("/download/{*path}", get(files::download_file))
        .route("/upload", post(files::upload_root))
        .route("/upload/{*path}", post(files::upload_into))
}

async fn admin_not_found() -> ApiError {
    ApiError::not_found("Unknown admin route")
}

/// Create the full API router
pub fn api_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/refresh-github", post(github::refresh_projects))
        .nest("/files", files_router())
        .fallback(admin_not_found)
        // Also guards the fallback and method mismatches
        .layer(middleware::from_fn_with_state(state.auth.clone(), require_auth));

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/healthz", get(health::liveness))
        .route("/readyz", get(health::readiness))
        .route("/content/tags", get(content::list_tags))
        .route("/content/{category}", get(content::list_content))
        .route("/content/{category}/{slug}", get(content::get_content_item))
        .route("/github/projects", get(github::list_projects));

    public
        .nest("/admin", admin)
        .with_state(state.clone())
        .nest("/auth", auth_router(state.auth))
}
