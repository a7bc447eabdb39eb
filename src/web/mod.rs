//! Web Module
//!
//! HTTP surface of the portfolio: public content API plus the token-gated
//! admin API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               Portfolio Server               │
//! ├──────────────────────────────────────────────┤
//! │  GET  /api/health          → Health check    │
//! │  POST /api/auth/login      → Authenticate    │
//! │  GET  /api/auth/verify     → Check token     │
//! │  GET  /api/content/*       → Markdown items  │
//! │  GET  /api/github/projects → Repo showcase   │
//! │  *    /api/admin/*         → Admin (bearer)  │
//! │  GET  /*                   → Static frontend │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod server;

pub use api::{api_router, ApiError, ApiResponse, AppState};
pub use auth::{AuthError, AuthState, Claims};
pub use server::{build_router, Server};
