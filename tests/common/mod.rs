//! Shared helpers for router-level tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use portfolio_server::{build_router, AppState, Config, RepoDetails, RepoSource};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin";
pub const BOUNDARY: &str = "portfolio-test-boundary";

/// Repository source that never touches the network
pub struct StubSource;

#[async_trait]
impl RepoSource for StubSource {
    async fn fetch(&self, owner: &str, repo: &str) -> anyhow::Result<RepoDetails> {
        if repo == "offline" {
            anyhow::bail!("connection refused");
        }
        Ok(RepoDetails {
            stars: 12,
            forks: 3,
            description: Some(format!("{} by {}", repo, owner)),
            readme: format!("# {}", repo),
        })
    }
}

/// Router over a throwaway content root
pub struct TestApp {
    pub router: Router,
    pub temp: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let config = Config::with_content_path(temp.path());
        let state = AppState::with_source(&config, Arc::new(StubSource))
            .await
            .expect("Failed to build state");
        let router = build_router(state, &config);
        Self { router, temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write a file directly into the content root
    pub fn write(&self, rel: &str, body: &str) {
        let path = self.temp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    pub async fn json(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(req).await;
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn login(&self) -> String {
        let (status, body) = self
            .json(post_json(
                "/api/auth/login",
                None,
                json!({"username": "admin", "password": ADMIN_PASSWORD}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Multipart request with one part per `(filename, content)` plus optional text fields
pub fn multipart(uri: &str, token: Option<&str>, files: &[(&str, &str)], fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (filename, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Markdown document with frontmatter
pub fn post(title: &str, date: &str, tags: &[&str]) -> String {
    format!(
        "---\ntitle: \"{}\"\ndate: \"{}\"\ntags: [{}]\ndescription: About {}\n---\n\n{} body\n",
        title,
        date,
        tags.join(", "),
        title,
        title
    )
}
