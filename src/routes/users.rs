use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserListQuery, UserResponse};
use crate::error::Result;
use crate::models::user::User;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list(&actor, query).await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(json!({ "users": users })))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.create(&actor, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": UserResponse::from(user)
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.update(&actor, id, payload).await?;
    Ok(Json(json!({
        "message": "User updated successfully",
        "user": UserResponse::from(user)
    })))
}
