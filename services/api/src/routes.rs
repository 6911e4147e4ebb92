//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware, validate_comment_content_middleware},
    models::{
        LoginRequest, NewUser, RecordId, RegisterRequest, TokenResponse, User, UserResponse,
        comment::{CreateCommentRequest, NewComment},
        record::{RecordDraft, RecordListResponse, RecordQuery},
        user_record::{UserRecord, UserRecordChanges, UserRecordDraft},
    },
    password::{hash_password, verify_password},
    state::AppState,
};

/// Create the router for the API service
///
/// Paths that mix public reads with authenticated writes get the auth layer
/// through `MethodRouter::route_layer`, which only wraps the methods
/// registered before it.
pub fn create_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let collection_routes = Router::new()
        .route("/collection", get(list_collection).post(add_to_collection))
        .route(
            "/collection/:id",
            get(get_collection_entry)
                .patch(update_collection_entry)
                .delete(remove_collection_entry),
        )
        .route("/comments/:id", delete(delete_comment))
        .route_layer(auth.clone());

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route(
            "/records",
            post(create_record)
                .route_layer(auth.clone())
                .get(list_records),
        )
        .route(
            "/records/:id",
            put(replace_record)
                .delete(delete_record)
                .route_layer(auth.clone())
                .get(get_record),
        )
        .route(
            "/records/:id/comments",
            post(create_comment)
                .route_layer(middleware::from_fn(validate_comment_content_middleware))
                .route_layer(auth)
                .get(list_comments),
        )
        .merge(collection_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = match &state.db_pool {
        Some(pool) => match common::database::health_check(pool).await {
            Ok(true) => "ok",
            _ => "unavailable",
        },
        None => "memory",
    };

    Json(json!({
        "status": "ok",
        "service": "phono-api",
        "storage": storage,
    }))
}

fn token_response(state: &AppState, user: User) -> ApiResult<TokenResponse> {
    let access_token = state.jwt_service.generate_token(user.id).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.token_ttl(),
        user: UserResponse::from(user),
    })
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let payload = payload.normalize()?;

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!("{}", e);
        ApiError::InternalServerError
    })?;

    let user = state
        .users
        .create(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
        })
        .await?;

    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(token_response(&state, user)?)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_username_or_email(payload.username_or_email.trim())
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let verified = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!("Failed to verify password for {}: {}", user.id, e);
        ApiError::InternalServerError
    })?;

    if !verified {
        warn!("Failed login for user {}", user.id);
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(token_response(&state, user)?))
}

/// List catalog records with pagination and search
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<impl IntoResponse> {
    let (items, total) = state.records.list(&query).await?;

    Ok(Json(RecordListResponse {
        items,
        page: query.page(),
        limit: query.limit(),
        total,
    }))
}

/// Create a catalog record
pub async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<RecordDraft>,
) -> ApiResult<impl IntoResponse> {
    let record = state.records.create(payload.validate()?).await?;
    info!("Created record {} ({} - {})", record.id, record.artist, record.title);

    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a catalog record by ID
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .records
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Record"))?;

    Ok(Json(record))
}

/// Replace the editable fields of a catalog record
pub async fn replace_record(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(payload): Json<RecordDraft>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .records
        .replace(id, payload.validate()?)
        .await?
        .ok_or(ApiError::NotFound("Record"))?;

    Ok(Json(record))
}

/// Delete a catalog record
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<impl IntoResponse> {
    if !state.records.delete(id).await? {
        return Err(ApiError::NotFound("Record"));
    }

    info!("Deleted record {}", id);
    Ok(Json(json!({ "message": "Record deleted successfully" })))
}

/// List the comments on a record
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<impl IntoResponse> {
    state
        .records
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Record"))?;

    Ok(Json(state.comments.list_by_record(id).await?))
}

/// Create a comment on a record; content arrives already trimmed
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<RecordId>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .records
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Record"))?;

    let comment = state
        .comments
        .create(NewComment {
            record: id,
            user: user.id,
            content: payload.content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Delete one of the caller's comments
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;

    if comment.user != user.id {
        return Err(ApiError::Forbidden);
    }

    state.comments.delete(id).await?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}

fn warn_on_orphan_asking_price(entry: &UserRecord) {
    if entry.has_orphan_asking_price() {
        warn!(
            "Collection entry {} has an asking price but is not for sale",
            entry.id
        );
    }
}

/// Fetch a collection entry, hiding entries owned by other users
async fn owned_entry(state: &AppState, user: &AuthUser, id: Uuid) -> ApiResult<UserRecord> {
    state
        .user_records
        .find_by_id(id)
        .await?
        .filter(|entry| entry.user == user.id)
        .ok_or(ApiError::NotFound("Collection entry"))
}

/// List the caller's collection
pub async fn list_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.user_records.list_by_user(user.id).await?))
}

/// Add a catalog record to the caller's collection
pub async fn add_to_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UserRecordDraft>,
) -> ApiResult<impl IntoResponse> {
    let draft = UserRecordDraft {
        user: Some(user.id),
        ..payload
    };
    let new_entry = draft.validate()?;

    state
        .records
        .find_by_id(new_entry.record)
        .await?
        .ok_or(ApiError::NotFound("Record"))?;

    let entry = state.user_records.insert(new_entry).await?;
    warn_on_orphan_asking_price(&entry);
    info!("User {} added record {} to their collection", entry.user, entry.record);

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Get one entry of the caller's collection
pub async fn get_collection_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(owned_entry(&state, &user, id).await?))
}

/// Edit condition, location, purchase or sale fields of a collection entry
pub async fn update_collection_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserRecordChanges>,
) -> ApiResult<impl IntoResponse> {
    let update = payload.validate()?;
    owned_entry(&state, &user, id).await?;

    let entry = state
        .user_records
        .update(id, update)
        .await?
        .ok_or(ApiError::NotFound("Collection entry"))?;
    warn_on_orphan_asking_price(&entry);

    Ok(Json(entry))
}

/// Remove a record from the caller's collection
pub async fn remove_collection_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    owned_entry(&state, &user, id).await?;

    if !state.user_records.delete(id).await? {
        return Err(ApiError::NotFound("Collection entry"));
    }

    Ok(Json(json!({ "message": "Record removed from collection" })))
}
