//! Portfolio Server
//!
//! Backend for a personal portfolio site: markdown content for the card
//! stacks, a GitHub repository showcase, and a token-gated admin API for
//! managing the content tree.
//!
//! # Features
//!
//! - **Content API**: project/blog/github items parsed from YAML-frontmatter markdown
//! - **GitHub Showcase**: configured repositories with cached stars, forks and README
//! - **File Admin**: sandboxed list/read/save/delete/rename/move/upload/download
//! - **Auth**: single admin account, Argon2id hash, HS256 bearer tokens
//! - **Frontend State**: card-stack state machine and theme model
//!
//! # Architecture
//!
//! ```text
//! Browser ──► /api/content ──► ContentStore ──┐
//!    │        /api/github  ──► GithubCatalog  ├──► CONTENT_PATH
//!    └──────► /api/admin   ──► FileStore ─────┘
//!              (bearer)           │
//!                                 └── invalidates ContentStore cache
//! ```

pub mod cache;
pub mod config;
pub mod content;
pub mod files;
pub mod github;
pub mod ui;
pub mod web;

pub use cache::{CacheStats, TtlCache};
pub use config::{Config, ConfigError};
pub use content::{Category, ContentError, ContentItem, ContentMetadata, ContentStore};
pub use files::{FileEntry, FileError, FileStore};
pub use github::{GithubApiSource, GithubCatalog, GithubError, GithubProject, RepoDetails, RepoSource};
pub use ui::{CardStacks, StackEvent, StackState, Theme, Transition};
pub use web::{build_router, AppState, Server};
