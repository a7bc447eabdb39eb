//! Response envelope
//!
//! Every JSON endpoint answers with `{success, data, message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::content::ContentError;
use crate::files::FileError;
use crate::github::GithubError;
use crate::web::auth::AuthError;

/// Standard API envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        })
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }
}

/// Error rendered as a `success: false` envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Log the cause, hide it from the client
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(self.message),
        });
        (self.status, body).into_response()
    }
}

impl From<FileError> for ApiError {
    fn from(e: FileError) -> Self {
        match e {
            FileError::NotFound(_) => Self::not_found(e.to_string()),
            FileError::Io(_) => Self::internal(e),
            FileError::InvalidPath(_)
            | FileError::NotEditable(_)
            | FileError::AlreadyExists(_)
            | FileError::IsFolder(_)
            | FileError::NotAFolder(_)
            | FileError::Binary(_) => Self::bad_request(e.to_string()),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::InvalidCategory(_) | ContentError::InvalidSlug(_) => {
                Self::bad_request(e.to_string())
            }
            ContentError::NotFound { .. } => Self::not_found(e.to_string()),
            ContentError::Malformed { .. } | ContentError::Io(_) => Self::internal(e),
        }
    }
}

impl From<GithubError> for ApiError {
    fn from(e: GithubError) -> Self {
        Self::internal(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            // Login failures stay 200 with success: false
            AuthError::InvalidCredentials => Self::new(StatusCode::OK, e.to_string()),
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                Self::new(StatusCode::UNAUTHORIZED, e.to_string())
            }
            AuthError::RateLimitExceeded => Self::new(StatusCode::TOO_MANY_REQUESTS, e.to_string()),
            AuthError::Internal(_) => Self::internal(e),
        }
    }
}
