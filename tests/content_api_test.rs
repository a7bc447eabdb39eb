//! Public content, GitHub and health endpoints

mod common;

use axum::http::StatusCode;
use common::{get, post, post_json, TestApp};
use serde_json::json;

const GITHUB_CONFIG: &str = r#"
repositories:
  - owner: eliot
    repo: portfolio
    display_name: Portfolio Site
    feature: true
    image: /images/portfolio.png
  - owner: eliot
    repo: offline
    display_name: Offline Repo
"#;

async fn seeded_app() -> TestApp {
    let app = TestApp::new().await;
    app.write("project/project1.md", &post("Project One", "2023-05-01", &["rust", "cli"]));
    app.write("project/project2.md", &post("Project Two", "2024-02-10", &["web"]));
    app.write("blog/hello.md", &post("Hello World", "2022-12-24", &["intro", "rust"]));
    app.write("github/config.yaml", GITHUB_CONFIG);
    app
}

#[tokio::test]
async fn test_list_content_newest_first() {
    let app = seeded_app().await;

    let (status, body) = app.json(get("/api/content/project", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["slug"], "project2");
    assert_eq!(items[0]["category"], "project");
    assert_eq!(items[1]["metadata"]["title"], "Project One");
}

#[tokio::test]
async fn test_unknown_category_is_empty() {
    let app = seeded_app().await;

    let (status, body) = app.json(get("/api/content/nonexistent", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_invalid_category_and_slug() {
    let app = seeded_app().await;

    let (status, _) = app.json(get("/api/content/Bad.Category", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.json(get("/api/content/blog/..%2Fsecret", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_content_item() {
    let app = seeded_app().await;

    let (status, body) = app.json(get("/api/content/project/project1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "project1");
    assert_eq!(body["data"]["metadata"]["title"], "Project One");
    assert_eq!(body["data"]["content"], "Project One body");

    let (status, body) = app.json(get("/api/content/project/missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_tags_aggregated() {
    let app = seeded_app().await;

    let (status, body) = app.json(get("/api/content/tags", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["cli", "intro", "rust", "web"]));
}

#[tokio::test]
async fn test_github_projects() {
    let app = seeded_app().await;

    let (status, body) = app.json(get("/api/github/projects", None)).await;
    assert_eq!(status, StatusCode::OK);

    let projects = body["data"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0]["display_name"], "Portfolio Site");
    assert_eq!(projects[0]["feature"], true);
    assert_eq!(projects[0]["stars"], 12);
    assert_eq!(projects[0]["readme"], "# portfolio");

    // Fetch failure degrades instead of failing the request
    assert_eq!(projects[1]["feature"], false);
    assert_eq!(projects[1]["readme"], "README not available");
}

#[tokio::test]
async fn test_github_projects_without_config() {
    let app = TestApp::new().await;
    let (status, body) = app.json(get("/api/github/projects", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_refresh_github() {
    let app = seeded_app().await;
    let token = app.login().await;

    let (status, body) = app
        .json(post_json("/api/admin/refresh-github", Some(&token), json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["message"], "Refreshed 2 projects");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app.json(get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
    assert!(body["uptime_secs"].is_number());

    let (status, _, _) = app.send(get("/api/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app.send(get("/api/readyz", None)).await;
    assert_eq!(status, StatusCode::OK);
}
