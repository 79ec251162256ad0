use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            CreateUserRequest, CreatedUserResponse, PageQuery, PublicUser, UpdateUserRequest,
            UserPage,
        },
        repo_types::UserId,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users).post(create_user))
        .route(
            "/user/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

fn parse_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::MalformedIdentifier(raw.to_string()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Query(q): Query<PageQuery>,
) -> Result<Json<UserPage>, ApiError> {
    let page = state.profiles.list_users(q.limit, q.page)?;
    Ok(Json(page))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let id = state.profiles.add_user(payload)?;
    info!(user_id = %id, by = %caller.id, "user added via api");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/user/{id}"))],
        Json(CreatedUserResponse { id }),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_id(&id)?;
    let user = state.profiles.get_user(id)?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    state.profiles.update_user(id, payload)?;
    info!(user_id = %id, by = %caller.id, "user updated via api");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.profiles.delete_user(id)?;
    info!(user_id = %id, by = %caller.id, "user removed via api");
    Ok(StatusCode::NO_CONTENT)
}
