//! Request middleware: bearer authentication and the comment content guard

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::Value;
use tracing::{error, warn};

use crate::{
    error::ApiError,
    models::UserId,
    state::AppState,
    validation::{CommentContentError, validate_comment_content},
};

/// Largest comment request body accepted, in bytes
const MAX_COMMENT_BODY_BYTES: usize = 64 * 1024;

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

/// Authentication middleware
///
/// Validates the bearer token, checks that its subject still exists and
/// inserts an [`AuthUser`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|e| {
            warn!("Failed to validate token: {}", e);
            ApiError::Unauthorized
        })?;

    let user = state.users.find_by_id(claims.sub).await.map_err(|e| {
        error!("Failed to load token subject: {}", e);
        ApiError::InternalServerError
    })?;

    let Some(user) = user else {
        warn!("Token subject {} no longer exists", claims.sub);
        return Err(ApiError::Unauthorized);
    };

    req.extensions_mut().insert(AuthUser { id: user.id });

    Ok(next.run(req).await)
}

/// Comment content guard
///
/// Rejects blank or oversized comment content with a 400 and
/// `{ "message": ... }`. On success the body's `content` is replaced by its
/// trimmed form and the request is forwarded; nothing else in the body
/// changes.
pub async fn validate_comment_content_middleware(
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = req.into_parts();

    let bytes = to_bytes(body, MAX_COMMENT_BODY_BYTES)
        .await
        .map_err(|_| ApiError::BadRequest("Request body is too large".to_string()))?;

    let mut payload: Value = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::BadRequest("Request body must be valid JSON".to_string()))?;

    // A missing, null or non-string content counts as no content at all
    let object = payload
        .as_object_mut()
        .ok_or(CommentContentError::EmptyContent)?;
    let content = object
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let trimmed = validate_comment_content(content)?.to_string();
    object.insert("content".to_string(), Value::String(trimmed));

    let body = serde_json::to_vec(&payload).map_err(|e| {
        error!("Failed to re-encode comment body: {}", e);
        ApiError::InternalServerError
    })?;

    parts.headers.remove(header::CONTENT_LENGTH);

    Ok(next.run(Request::from_parts(parts, Body::from(body))).await)
}
