//! Portfolio HTTP Server
//!
//! Axum server with CORS, request tracing, an optional static frontend and
//! graceful shutdown.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use std::net::SocketAddr;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::web::api::{api_router, AppState};

/// Build the router with all routes and middleware
pub fn build_router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&config.cors_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let mut router = Router::new().nest("/api", api_router(state));

    if let Some(frontend) = &config.frontend_path {
        if frontend.is_dir() {
            router = router.fallback_service(ServeDir::new(frontend));
        } else {
            warn!(path = %frontend.display(), "Frontend directory missing, serving API only");
        }
    }

    router
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// `*` anywhere in the list allows every origin
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|o| o == "*") {
        return AllowOrigin::any();
    }

    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(list)
}

/// Portfolio server
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Open the content root and prepare shared state
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let state = AppState::from_config(&config).await?;
        Ok(Self { config, state })
    }

    /// Start the server and run until shutdown signal
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.socket_addr();
        let router = build_router(self.state, &self.config);

        info!(
            content = %self.config.content_path.display(),
            "Portfolio server available at {}",
            self.config.base_url()
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;

        // Peer addresses key the login limiter
        axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Portfolio server shut down gracefully");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn router_with_origins(origins: &[&str]) -> (Router, TempDir) {
        let temp = TempDir::new().unwrap();
        let config = Config {
            cors_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..Config::with_content_path(temp.path())
        };
        let state = AppState::from_config(&config).await.unwrap();
        (build_router(state, &config), temp)
    }

    async fn allow_origin_for(router: Router, origin: &str) -> Option<String> {
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/healthz")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_wildcard_cors_origin() {
        let (router, _temp) = router_with_origins(&["*"]).await;
        assert_eq!(
            allow_origin_for(router, "https://example.org").await.as_deref(),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_listed_cors_origins() {
        let (router, _temp) = router_with_origins(&["http://localhost:3000", "bad\norigin"]).await;
        assert_eq!(
            allow_origin_for(router.clone(), "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(allow_origin_for(router, "https://evil.example").await, None);
    }
}
