//! GitHub Showcase
//!
//! Repositories to showcase are listed in `<content>/github/config.yaml`:
//!
//! ```yaml
//! repositories:
//!   - owner: eliot
//!     repo: portfolio
//!     display_name: Portfolio
//!     feature: true
//!     image: /images/portfolio.png
//! ```
//!
//! Live data (stars, forks, description, README) is fetched through a
//! [`RepoSource`] and cached until the TTL runs out or an admin refreshes.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;

/// README placeholder when the API is unreachable
pub const README_UNAVAILABLE: &str = "README not available";

/// GitHub catalog errors
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Failed to load GitHub config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One configured repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    pub owner: String,
    pub repo: String,
    pub display_name: String,
    #[serde(default)]
    pub feature: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Showcase configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    #[serde(default)]
    pub repositories: Vec<RepoConfig>,
}

impl ShowcaseConfig {
    /// Load from disk; a missing file means nothing to showcase
    pub async fn load(path: &std::path::Path) -> Result<Self, GithubError> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(serde_yaml::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No GitHub showcase config");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Live repository data
#[derive(Debug, Clone)]
pub struct RepoDetails {
    pub stars: u32,
    pub forks: u32,
    pub description: Option<String>,
    pub readme: String,
}

/// Where repository details come from
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn fetch(&self, owner: &str, repo: &str) -> anyhow::Result<RepoDetails>;
}

/// GitHub REST API source
pub struct GithubApiSource {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubApiSource {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: api_url.into(),
            token,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header(USER_AGENT, "portfolio-server");
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct RepoResponse {
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    forks_count: u32,
    description: Option<String>,
}

#[async_trait]
impl RepoSource for GithubApiSource {
    async fn fetch(&self, owner: &str, repo: &str) -> anyhow::Result<RepoDetails> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner, repo);
        let info: RepoResponse = self
            .get(&url)
            .send()
            .await
            .context("Failed to reach GitHub")?
            .error_for_status()
            .context("GitHub rejected repo request")?
            .json()
            .await
            .context("Invalid repo response")?;

        // README is optional; a repo without one is still worth showing
        let readme = match self
            .get(&format!("{}/readme", url))
            .header(ACCEPT, "application/vnd.github.raw")
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response.text().await.unwrap_or_else(|_| README_UNAVAILABLE.to_string()),
            Err(e) => {
                debug!(%owner, %repo, error = %e, "README fetch failed");
                README_UNAVAILABLE.to_string()
            }
        };

        Ok(RepoDetails {
            stars: info.stargazers_count,
            forks: info.forks_count,
            description: info.description,
            readme,
        })
    }
}

/// A showcased repository as served to the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubProject {
    pub owner: String,
    pub repo: String,
    pub display_name: String,
    /// README markdown
    pub readme: String,
    pub url: String,
    pub stars: u32,
    pub forks: u32,
    pub description: Option<String>,
    pub feature: bool,
    pub image: Option<String>,
}

impl GithubProject {
    fn from_parts(config: &RepoConfig, details: RepoDetails) -> Self {
        Self {
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            display_name: config.display_name.clone(),
            readme: details.readme,
            url: format!("https://github.com/{}/{}", config.owner, config.repo),
            stars: details.stars,
            forks: details.forks,
            description: details.description,
            feature: config.feature.unwrap_or(false),
            image: config.image.clone(),
        }
    }

    /// Stand-in built from config alone
    fn fallback(config: &RepoConfig) -> Self {
        Self::from_parts(
            config,
            RepoDetails {
                stars: 0,
                forks: 0,
                description: Some("GitHub repository".to_string()),
                readme: README_UNAVAILABLE.to_string(),
            },
        )
    }

    /// Config owns presentation flags, so they win over cached data
    fn with_config(mut self, config: &RepoConfig) -> Self {
        self.display_name = config.display_name.clone();
        self.feature = config.feature.unwrap_or(false);
        self.image = config.image.clone();
        self
    }
}

/// Cached GitHub showcase
#[derive(Clone)]
pub struct GithubCatalog {
    config_path: PathBuf,
    source: Arc<dyn RepoSource>,
    cache: TtlCache<GithubProject>,
}

impl GithubCatalog {
    pub fn new(config_path: impl Into<PathBuf>, source: Arc<dyn RepoSource>, ttl: Duration) -> Self {
        Self {
            config_path: config_path.into(),
            source,
            cache: TtlCache::new("github", 256, ttl),
        }
    }

    /// All configured projects in config order
    ///
    /// Fetch failures degrade to a config-only project that is not cached,
    /// so the next request tries again.
    pub async fn projects(&self) -> Result<Vec<GithubProject>, GithubError> {
        let config = ShowcaseConfig::load(&self.config_path).await?;
        let mut projects = Vec::with_capacity(config.repositories.len());

        for repo in &config.repositories {
            let key = format!("{}/{}", repo.owner, repo.repo);

            if let Some(cached) = self.cache.get(&key).await {
                projects.push(cached.with_config(repo));
                continue;
            }

            match self.source.fetch(&repo.owner, &repo.repo).await {
                Ok(details) => {
                    let project = GithubProject::from_parts(repo, details);
                    self.cache.set(&key, project.clone()).await;
                    projects.push(project);
                }
                Err(e) => {
                    warn!(repo = %key, error = %e, "Failed to fetch GitHub project");
                    projects.push(GithubProject::fallback(repo));
                }
            }
        }

        Ok(projects)
    }

    /// Drop cached data and fetch everything again; returns the project count
    pub async fn refresh(&self) -> Result<usize, GithubError> {
        self.cache.clear();
        let count = self.projects().await?.len();
        info!(count, "GitHub cache refreshed");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StubSource {
        calls: AtomicUsize,
        fail_repo: Option<&'static str>,
    }

    #[async_trait]
    impl RepoSource for StubSource {
        async fn fetch(&self, owner: &str, repo: &str) -> anyhow::Result<RepoDetails> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(repo) == self.fail_repo {
                anyhow::bail!("rate limited");
            }
            Ok(RepoDetails {
                stars: 42,
                forks: 7,
                description: Some(format!("{}/{}", owner, repo)),
                readme: "# Hello".to_string(),
            })
        }
    }

    const CONFIG: &str = r#"
repositories:
  - owner: eliot
    repo: alpha
    display_name: Alpha
    feature: true
    image: /images/alpha.png
  - owner: eliot
    repo: beta
    display_name: Beta
"#;

    fn catalog(fail_repo: Option<&'static str>) -> (GithubCatalog, Arc<StubSource>, TempDir) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, CONFIG).unwrap();
        let source = Arc::new(StubSource {
            calls: AtomicUsize::new(0),
            fail_repo,
        });
        let catalog = GithubCatalog::new(path, source.clone(), Duration::from_secs(3600));
        (catalog, source, temp)
    }

    #[tokio::test]
    async fn test_projects_fetched_and_cached() {
        let (catalog, source, _temp) = catalog(None);

        let projects = catalog.projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].stars, 42);
        assert!(projects[0].feature);
        assert!(!projects[1].feature);
        assert_eq!(projects[0].url, "https://github.com/eliot/alpha");

        catalog.projects().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back() {
        let (catalog, source, _temp) = catalog(Some("beta"));

        let projects = catalog.projects().await.unwrap();
        assert_eq!(projects[1].readme, README_UNAVAILABLE);
        assert_eq!(projects[1].stars, 0);

        // Failed repo is retried, the healthy one stays cached
        catalog.projects().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let (catalog, source, _temp) = catalog(None);
        catalog.projects().await.unwrap();

        let count = catalog.refresh().await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_missing_config_is_empty() {
        let source = Arc::new(StubSource {
            calls: AtomicUsize::new(0),
            fail_repo: None,
        });
        let catalog = GithubCatalog::new("/nonexistent/config.yaml", source, Duration::from_secs(60));
        assert!(catalog.projects().await.unwrap().is_empty());
    }
}
