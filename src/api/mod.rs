//! REST API endpoints.
//!
//! Axum-based HTTP API for accounts, teams, players and game lines, plus
//! unauthenticated public views of a team or player. Everything lives
//! under `/api/v1`; uploaded images are served from `/uploads`.

pub mod extract;
pub mod routes;
pub mod state;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit,
    },
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::access::AccessError;
use crate::auth::AuthError;
use crate::storage::uploads::UPLOADS_ROUTE;
use crate::storage::{StorageError, UploadError};

use routes::{auth, games, health, players, public, teams};
use state::AppState;

/// Path prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Room left in a request body for form fields next to the image itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("Upload rejected: {0}")]
    UploadUnsupported(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UploadUnsupported(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UploadTooLarge(_) | ApiError::UploadUnsupported(_) => "UPLOAD_REJECTED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                "Something went wrong".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(msg) => ApiError::Conflict(msg),
            StorageError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound(entity) => ApiError::NotFound(entity.to_string()),
            AccessError::Forbidden(_) => ApiError::Forbidden("Access denied".to_string()),
            AccessError::Storage(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::Expired
            | AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidKey(_) | AuthError::Hashing(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => ApiError::UploadTooLarge(err.to_string()),
            UploadError::UnsupportedType(_) => ApiError::UploadUnsupported(err.to_string()),
            UploadError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::UploadTooLarge(err.body_text())
        } else {
            ApiError::Validation(err.body_text())
        }
    }
}

/// Confirmation body for deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.images.max_bytes().saturating_add(MULTIPART_OVERHEAD));
    let uploads = ServeDir::new(state.images.dir());

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register).layer(upload_limit))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/teams/:id/players", get(players::list_team_players))
        .route("/players", post(players::create_player).layer(upload_limit))
        .route(
            "/players/:id",
            get(players::get_player).delete(players::delete_player),
        )
        .route("/players/:id/games", get(games::list_player_games))
        .route("/games", post(games::create_game))
        .route("/games/:id", put(games::update_game).delete(games::delete_game))
        .route("/public/teams/:id", get(public::public_team))
        .route("/public/players/:id", get(public::public_player));

    Router::new()
        .nest(API_PREFIX, api)
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured origin; `*` allows any origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ApiError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(origin.trim())
        .map_err(|e| ApiError::Validation(format!("invalid CORS origin {:?}: {}", origin, e)))?;
    Ok(layer.allow_origin(origin))
}
