//! Feed service routes

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    identity::ResourceId,
    middleware::json_charset,
    models::{CreatePostRequest, CreateUserRequest, CreatedResponse, UserResponse},
    pagination::{FeedCursor, FeedPageRequest},
    state::AppState,
};

/// Create the router for the feed service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/posts", post(create_post))
        .route("/posts/:id", get(get_post))
        .route("/posts/users/:id", get(get_user_posts))
        .layer(middleware::map_response(json_charset))
        .with_state(state)
}

/// Body returned when a well-formed id matches nothing
fn not_found() -> Response {
    Json(json!({})).into_response()
}

/// Decode a JSON request body whatever content type the client declared
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        ApiError::BadRequest(format!("Failed to parse the request body as JSON: {e}"))
    })
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "feed-service"
    }))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> ApiResult<Json<CreatedResponse>> {
    let payload: CreateUserRequest = parse_body(&body)?;
    let new_user = payload.into_new_user()?;
    let id = state.users.create(new_user).await?;

    Ok(Json(CreatedResponse { id }))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: ResourceId = id.parse()?;

    let response = match state.users.find_by_id(id).await? {
        Some(user) => Json(UserResponse::from(user)).into_response(),
        None => not_found(),
    };

    Ok(response)
}

/// Create a new post
pub async fn create_post(
    State(state): State<AppState>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> ApiResult<Json<CreatedResponse>> {
    let payload: CreatePostRequest = parse_body(&body)?;
    let new_post = payload.into_new_post(Utc::now())?;
    let id = state.posts.create(new_post).await?;

    Ok(Json(CreatedResponse { id }))
}

/// Get a post by ID
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: ResourceId = id.parse()?;

    let response = match state.posts.find_by_id(id).await? {
        Some(post) => Json(post).into_response(),
        None => not_found(),
    };

    Ok(response)
}

/// Get one page of a user's posts, newest first
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> ApiResult<Response> {
    let author_id: ResourceId = id.parse()?;
    let request: FeedPageRequest = parse_body(&body)?;
    let cursor = FeedCursor::try_from(request)?;

    let page = state
        .paginator
        .next_page(state.posts.as_ref(), author_id, &cursor)
        .await?;

    debug!(
        "Feed page for {} has {} posts, next position {:?}",
        author_id,
        page.posts.len(),
        page.next_position()
    );

    Ok(Json(page.posts).into_response())
}
