//! Admin user management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use common::AppResult;
use domain::{CreateUserRequest, SearchUsersRequest, UpdateUserRequest, UserView};

/// Username availability query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExistsQuery {
    /// Exact username to look up
    pub username: String,
}

/// Username availability answer
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Create admin user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/search", post(search_users))
        .route("/exists", get(username_exists))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/api/admin/user",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Validation error or passwords don't match"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user = state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by id, disabled users included
#[utoipa::path(
    get,
    path = "/api/admin/user/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserView),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserView>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

/// Update a user's profile fields
#[utoipa::path(
    put,
    path = "/api/admin/user/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserView),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserView>> {
    let user = state.user_service.update(id, payload).await?;
    Ok(Json(user))
}

/// Disable a user account. The record is kept.
#[utoipa::path(
    delete,
    path = "/api/admin/user/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User disabled", body = UserView),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserView>> {
    let user = state.user_service.delete(id).await?;
    Ok(Json(user))
}

/// Search users by id, username or full name
#[utoipa::path(
    post,
    path = "/api/admin/user/search",
    tag = "Users",
    request_body = SearchUsersRequest,
    responses(
        (status = 200, description = "Matching users ordered by username", body = Vec<UserView>),
        (status = 400, description = "Validation error")
    )
)]
pub async fn search_users(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SearchUsersRequest>,
) -> AppResult<Json<Vec<UserView>>> {
    let users = state.user_service.search_users(payload).await?;
    Ok(Json(users))
}

/// Check whether a username is taken
#[utoipa::path(
    get,
    path = "/api/admin/user/exists",
    tag = "Users",
    params(ExistsQuery),
    responses(
        (status = 200, description = "Lookup result", body = ExistsResponse)
    )
)]
pub async fn username_exists(
    State(state): State<AppState>,
    Query(query): Query<ExistsQuery>,
) -> AppResult<Json<ExistsResponse>> {
    let exists = state.user_service.username_exists(&query.username).await?;
    Ok(Json(ExistsResponse { exists }))
}
