use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::WWW_AUTHENTICATE_CHALLENGE;
use crate::store::StoreError;

/// Unified error type for handler Results.
///
/// Leadership errors never reach this type; handlers route
/// `StoreError::NotLeader` through the redirect engine instead.
#[derive(Debug)]
pub enum ApiError {
    /// Client input error. Never retried by the server.
    BadRequest(String),
    /// Bad credentials or insufficient permission. Deliberately carries no
    /// detail so the two cases are indistinguishable.
    Unauthorized,
    /// The request cannot be served here and no redirect target exists.
    Unavailable(String),
    /// Backend failure unrelated to leadership.
    Internal(String),
}

impl ApiError {
    /// Map a non-leadership store failure onto the error taxonomy.
    pub fn from_store(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, error_body(msg)).into_response()
            }
            ApiError::Unauthorized => Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header(header::WWW_AUTHENTICATE, WWW_AUTHENTICATE_CHALLENGE)
                .body(Body::empty())
                .unwrap_or_else(|_| StatusCode::UNAUTHORIZED.into_response()),
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, error_body(msg)).into_response()
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_body(msg)).into_response()
            }
        }
    }
}

fn error_body(message: String) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}
