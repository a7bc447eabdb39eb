//! Content Store
//!
//! Markdown documents with YAML frontmatter, grouped by category folder:
//!
//! ```text
//! <content>/project/*.md
//! <content>/blog/*.md
//! <content>/github/*.md   (+ config.yaml, see crate::github)
//! ```
//!
//! Bodies are returned as raw markdown; rendering is left to the frontend.

pub mod frontmatter;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::cache::TtlCache;
pub use frontmatter::{parse_frontmatter, FrontmatterError};

static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_-]{1,32}$").expect("valid regex"));
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,100}$").expect("valid regex"));

/// Content errors
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Invalid category parameter: {0}")]
    InvalidCategory(String),

    #[error("Invalid slug parameter: {0}")]
    InvalidSlug(String),

    #[error("Content not found: {category}/{slug}")]
    NotFound { category: String, slug: String },

    #[error("Malformed content file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Project,
    Blog,
    Github,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Project, Category::Blog, Category::Github];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Project => "project",
            Category::Blog => "blog",
            Category::Github => "github",
        }
    }

    /// Parse a route segment; `Ok(None)` for a well-formed but unknown category
    pub fn parse(raw: &str) -> Result<Option<Self>, ContentError> {
        if !CATEGORY_RE.is_match(raw) {
            return Err(ContentError::InvalidCategory(raw.to_string()));
        }
        Ok(Self::ALL.into_iter().find(|c| c.as_str() == raw))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frontmatter of a content document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub feature: Option<bool>,
}

/// A parsed content document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub slug: String,
    pub metadata: ContentMetadata,
    /// Markdown body
    pub content: String,
    pub category: Category,
}

/// Validate a slug route segment
pub fn validate_slug(slug: &str) -> Result<(), ContentError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(ContentError::InvalidSlug(slug.to_string()))
    }
}

/// Read-only view over the content tree with a per-item cache
#[derive(Clone)]
pub struct ContentStore {
    root: PathBuf,
    cache: TtlCache<ContentItem>,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            root: root.into(),
            cache: TtlCache::new("content", 1_000, ttl),
        }
    }

    /// All items of a category, newest first
    ///
    /// Unknown categories yield an empty list. Files that fail to parse are
    /// skipped with a warning.
    pub async fn list(&self, category: &str) -> Result<Vec<ContentItem>, ContentError> {
        let Some(category) = Category::parse(category)? else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for slug in self.slugs(category).await? {
            match self.load(category, &slug).await {
                Ok(item) => items.push(item),
                Err(e) => warn!(%category, %slug, error = %e, "Skipping unreadable content"),
            }
        }

        items.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));
        Ok(items)
    }

    /// A single item
    pub async fn get(&self, category: &str, slug: &str) -> Result<ContentItem, ContentError> {
        let parsed = Category::parse(category)?;
        validate_slug(slug)?;

        let category = parsed.ok_or_else(|| ContentError::NotFound {
            category: category.to_string(),
            slug: slug.to_string(),
        })?;

        self.load(category, slug).await
    }

    /// Unique tags across every category, sorted
    pub async fn tags(&self) -> Result<Vec<String>, ContentError> {
        let mut tags = BTreeSet::new();
        for category in Category::ALL {
            for item in self.list(category.as_str()).await? {
                tags.extend(item.metadata.tags.into_iter().filter(|t| !t.trim().is_empty()));
            }
        }
        Ok(tags.into_iter().collect())
    }

    /// Drop every cached item (after admin edits)
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }

    async fn slugs(&self, category: Category) -> Result<Vec<String>, ContentError> {
        let dir = self.root.join(category.as_str());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut slugs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if SLUG_RE.is_match(stem) && entry.file_type().await?.is_file() {
                    slugs.push(stem.to_string());
                }
            }
        }

        slugs.sort();
        Ok(slugs)
    }

    async fn load(&self, category: Category, slug: &str) -> Result<ContentItem, ContentError> {
        let key = format!("{}/{}", category, slug);
        if let Some(item) = self.cache.get(&key).await {
            return Ok(item);
        }

        let path = self.root.join(category.as_str()).join(format!("{}.md", slug));
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound {
                    category: category.to_string(),
                    slug: slug.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let (metadata, content): (ContentMetadata, String) =
            parse_frontmatter(&raw).map_err(|source| ContentError::Malformed {
                path: key.clone(),
                source,
            })?;

        let item = ContentItem {
            slug: slug.to_string(),
            metadata,
            content,
            category,
        };

        debug!(%key, "Content parsed");
        self.cache.set(&key, item.clone()).await;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn post(title: &str, date: &str, tags: &[&str]) -> String {
        format!(
            "---\ntitle: {}\ndate: \"{}\"\ntags: [{}]\ndescription: About {}\n---\n\n# {}\n\nBody.\n",
            title,
            date,
            tags.join(", "),
            title,
            title
        )
    }

    fn create_store() -> (ContentStore, TempDir) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write(temp.path(), "blog/older.md", &post("Older", "2023-01-10", &["rust"]));
        write(temp.path(), "blog/newer.md", &post("Newer", "2024-06-01", &["web", "rust"]));
        write(temp.path(), "blog/broken.md", "no frontmatter here");
        write(temp.path(), "blog/notes.txt", "ignored");
        write(temp.path(), "project/alpha.md", &post("Alpha", "2022-03-03", &["cli"]));
        let store = ContentStore::new(temp.path(), Duration::from_secs(3600));
        (store, temp)
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("blog").unwrap(), Some(Category::Blog));
        assert_eq!(Category::parse("nonexistent").unwrap(), None);
        assert!(matches!(Category::parse("../etc"), Err(ContentError::InvalidCategory(_))));
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("project1").is_ok());
        assert!(validate_slug("my_post-2").is_ok());
        assert!(validate_slug("..").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("").is_err());
    }

    #[tokio::test]
    async fn test_list_sorted_newest_first() {
        let (store, _temp) = create_store();
        let items = store.list("blog").await.unwrap();

        let slugs: Vec<_> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);
        assert!(items.iter().all(|i| i.category == Category::Blog));
        assert!(items[0].content.starts_with("# Newer"));
    }

    #[tokio::test]
    async fn test_list_unknown_category_is_empty() {
        let (store, _temp) = create_store();
        assert!(store.list("nonexistent").await.unwrap().is_empty());
        assert!(store.list("github").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_item_and_missing() {
        let (store, _temp) = create_store();

        let item = store.get("project", "alpha").await.unwrap();
        assert_eq!(item.metadata.title, "Alpha");
        assert_eq!(item.metadata.tags, vec!["cli"]);

        assert!(matches!(
            store.get("project", "missing").await,
            Err(ContentError::NotFound { .. })
        ));
        assert!(matches!(
            store.get("project", "bad.slug").await,
            Err(ContentError::InvalidSlug(_))
        ));
        assert!(matches!(
            store.get("blog", "broken").await,
            Err(ContentError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_tags_unique_and_sorted() {
        let (store, _temp) = create_store();
        assert_eq!(store.tags().await.unwrap(), vec!["cli", "rust", "web"]);
    }

    #[tokio::test]
    async fn test_cache_until_invalidated() {
        let (store, temp) = create_store();
        assert_eq!(store.get("project", "alpha").await.unwrap().metadata.title, "Alpha");

        write(temp.path(), "project/alpha.md", &post("Alpha v2", "2022-03-03", &[]));
        assert_eq!(store.get("project", "alpha").await.unwrap().metadata.title, "Alpha");

        store.invalidate();
        assert_eq!(store.get("project", "alpha").await.unwrap().metadata.title, "Alpha v2");
    }
}
