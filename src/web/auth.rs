//! Admin Authentication
//!
//! Single admin account, Argon2id password hash, stateless HS256 bearer tokens.
//!
//! # Endpoints
//!
//! - `POST /api/auth/login` - Exchange credentials for a token
//! - `POST /api/auth/logout` - Acknowledge logout (tokens expire on their own)
//! - `GET /api/auth/verify` - Check a bearer token
//!
//! Failed login attempts are rate limited per client address. The address is
//! the TCP peer unless proxy headers are trusted.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::web::api::response::{ApiError, ApiResponse};

/// Rate limit window (60 seconds)
const RATE_LIMIT_WINDOW_SECS: i64 = 60;

/// Role carried by admin tokens
pub const ADMIN_ROLE: &str = "admin";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Too many login attempts, try again later")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (admin username)
    pub sub: String,
    pub role: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID
    pub jti: String,
}

/// A freshly signed token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    attempts: u32,
    window_start: DateTime<Utc>,
}

/// Authentication state
pub struct AuthState {
    username: String,
    password_hash: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    max_attempts: u32,
    trust_proxy_headers: bool,
    rate_limits: Mutex<HashMap<String, RateLimitEntry>>,
}

impl AuthState {
    /// Build from config, hashing a plaintext password if no hash is given
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        let password_hash = match &config.admin_password_hash {
            Some(hash) => {
                PasswordHash::new(hash)
                    .map_err(|e| AuthError::Internal(format!("Invalid ADMIN_PASSWORD_HASH: {}", e)))?;
                hash.clone()
            }
            None => {
                if config.admin_password == "admin" {
                    warn!("Admin account uses the default password - set ADMIN_PASSWORD");
                }
                Self::hash_password(&config.admin_password)?
            }
        };

        let token_ttl = Duration::try_hours(config.token_ttl_hours)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                AuthError::Internal(format!("Invalid token lifetime: {}h", config.token_ttl_hours))
            })?;

        Ok(Self {
            username: config.admin_username.clone(),
            password_hash,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl,
            max_attempts: config.login_max_attempts,
            trust_proxy_headers: config.trust_proxy_headers,
            rate_limits: Mutex::new(HashMap::new()),
        })
    }

    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn check_rate_limit(&self, client: &str) -> Result<(), AuthError> {
        let mut rate_limits = self.rate_limits.lock();
        let now = Utc::now();

        rate_limits.retain(|_, entry| (now - entry.window_start).num_seconds() <= RATE_LIMIT_WINDOW_SECS);

        match rate_limits.get(client) {
            Some(entry) if entry.attempts >= self.max_attempts => Err(AuthError::RateLimitExceeded),
            _ => Ok(()),
        }
    }

    fn record_failure(&self, client: &str) {
        self.rate_limits
            .lock()
            .entry(client.to_string())
            .or_insert(RateLimitEntry {
                attempts: 0,
                window_start: Utc::now(),
            })
            .attempts += 1;
    }

    /// Check credentials and issue a token
    ///
    /// Only failures count toward the limit; a successful login clears them.
    pub fn authenticate(&self, username: &str, password: &str, client: &str) -> Result<IssuedToken, AuthError> {
        self.check_rate_limit(client)?;

        // Hash check runs even for unknown users
        let password_ok = Self::verify_password(password, &self.password_hash)?;
        if username != self.username || !password_ok {
            self.record_failure(client);
            warn!(%client, "Failed admin login");
            return Err(AuthError::InvalidCredentials);
        }

        self.rate_limits.lock().remove(client);
        info!(%client, "Admin logged in");
        self.issue_token()
    }

    fn issue_token(&self) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: self.username.clone(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a bearer token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Validate the `Authorization: Bearer` header of a request
    pub fn validate_headers(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let bearer = headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(AuthError::MissingToken)?;
        self.validate_token(bearer.token())
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Verified identity
#[derive(Debug, Serialize)]
pub struct Identity {
    pub sub: String,
    pub role: String,
}

/// Address used to key the login limiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl FromRequestParts<Arc<AuthState>> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AuthState>) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(client_address(&parts.headers, peer, state.trust_proxy_headers)))
    }
}

/// Client address: proxy headers when trusted, else the TCP peer
fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .or_else(|| headers.get("x-real-ip").and_then(|h| h.to_str().ok()))
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Login handler
pub async fn login_handler(
    State(state): State<Arc<AuthState>>,
    ClientAddr(client): ClientAddr,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<IssuedToken>>, ApiError> {
    let issued = state.authenticate(&req.username, &req.password, &client)?;
    Ok(ApiResponse::ok(issued))
}

/// Logout handler
pub async fn logout_handler() -> Json<ApiResponse<()>> {
    ApiResponse::message("Logged out")
}

/// Verify handler (runs behind `require_auth`)
pub async fn verify_handler(Extension(claims): Extension<Claims>) -> Json<ApiResponse<Identity>> {
    ApiResponse::ok(Identity {
        sub: claims.sub,
        role: claims.role,
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Reject requests without a valid bearer token
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = state.validate_headers(req.headers())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// ============================================================================
// Router
// ============================================================================

/// Create the authentication router
pub fn auth_router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route(
            "/verify",
            get(verify_handler).route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        )
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .with_state(state)
}
