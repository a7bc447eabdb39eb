//! Configuration management
//!
//! Everything is read from environment variables (a `.env` file is loaded by
//! `main` through dotenvy before this runs).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Default upload limit (50 MiB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Longest accepted token lifetime (one year)
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address (default: 127.0.0.1)
    pub host: IpAddr,

    /// Port number (default: 4000)
    pub port: u16,

    /// Root of the content tree; also the sandbox for the file admin API
    pub content_path: PathBuf,

    /// Static frontend directory served as router fallback
    pub frontend_path: Option<PathBuf>,

    /// Admin account name
    pub admin_username: String,

    /// Plaintext admin password, hashed once at startup
    pub admin_password: String,

    /// Pre-hashed admin password (Argon2 PHC string), wins over the plaintext one
    pub admin_password_hash: Option<String>,

    /// HS256 signing secret (random when unset)
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub token_ttl_hours: i64,

    /// Parsed content item TTL in seconds
    pub content_cache_ttl_secs: u64,

    /// GitHub project data TTL in seconds
    pub github_cache_ttl_secs: u64,

    /// GitHub REST API base URL
    pub github_api_url: String,

    /// Optional GitHub token (raises the API rate limit)
    pub github_token: Option<String>,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,

    /// Request body limit for uploads
    pub max_upload_bytes: usize,

    /// Failed login attempts per client per minute
    pub login_max_attempts: u32,

    /// Take the client address from `X-Forwarded-For`/`X-Real-IP`
    /// (only behind a reverse proxy that sets them)
    pub trust_proxy_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 4000,
            content_path: PathBuf::from("../content"),
            frontend_path: None,
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            admin_password_hash: None,
            jwt_secret: random_secret(),
            token_ttl_hours: 24,
            content_cache_ttl_secs: 3600,
            github_cache_ttl_secs: 24 * 3600,
            github_api_url: "https://api.github.com".to_string(),
            github_token: None,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:4000".to_string(),
                "http://127.0.0.1:4000".to_string(),
            ],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            login_max_attempts: 10,
            trust_proxy_headers: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = env_parse::<IpAddr>("HOST")? {
            config.host = host;
        }
        if let Some(port) = env_parse::<u16>("PORT")? {
            config.port = port;
        }
        if let Ok(path) = std::env::var("CONTENT_PATH") {
            config.content_path = PathBuf::from(path);
        }
        config.frontend_path = std::env::var("FRONTEND_PATH").ok().map(PathBuf::from);

        if let Ok(username) = std::env::var("ADMIN_USERNAME") {
            config.admin_username = username;
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            config.admin_password = password;
        }
        config.admin_password_hash = std::env::var("ADMIN_PASSWORD_HASH").ok();

        match std::env::var("JWT_SECRET") {
            Ok(secret) => config.jwt_secret = secret,
            Err(_) => {
                tracing::warn!("No JWT_SECRET configured - using random secret, tokens will not survive a restart")
            }
        }
        if let Some(hours) = env_parse::<i64>("TOKEN_TTL_HOURS")? {
            config.token_ttl_hours = check_token_ttl(hours)?;
        }
        if let Some(ttl) = env_parse::<u64>("CONTENT_CACHE_TTL_SECS")? {
            config.content_cache_ttl_secs = ttl;
        }
        if let Some(ttl) = env_parse::<u64>("GITHUB_CACHE_TTL_SECS")? {
            config.github_cache_ttl_secs = ttl;
        }
        if let Ok(url) = std::env::var("GITHUB_API_URL") {
            config.github_api_url = url.trim_end_matches('/').to_string();
        }
        config.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(limit) = env_parse::<usize>("MAX_UPLOAD_BYTES")? {
            config.max_upload_bytes = limit;
        }
        if let Some(attempts) = env_parse::<u32>("LOGIN_MAX_ATTEMPTS")? {
            config.login_max_attempts = attempts;
        }
        if let Some(trust) = env_parse::<bool>("TRUST_PROXY_HEADERS")? {
            config.trust_proxy_headers = trust;
        }

        Ok(config)
    }

    /// Configuration rooted at an explicit content directory (for testing)
    pub fn with_content_path(content_path: impl Into<PathBuf>) -> Self {
        Self {
            content_path: content_path.into(),
            jwt_secret: "test-secret-at-least-32-characters-long".to_string(),
            ..Default::default()
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Path of the GitHub showcase configuration
    pub fn github_config_path(&self) -> PathBuf {
        self.content_path.join("github").join("config.yaml")
    }
}

fn env_parse<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(None),
    }
}

fn check_token_ttl(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::Invalid {
            var: "TOKEN_TTL_HOURS",
            value: hours.to_string(),
        })
    }
}

fn random_secret() -> String {
    (0..64)
        .map(|_| {
            let idx = rand::random::<usize>() % 62;
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"[idx] as char
        })
        .collect()
}
