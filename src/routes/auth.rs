use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::dto::user_dto::UserResponse;
use crate::error::Result;
use crate::middleware::auth::issue_token;
use crate::models::user::User;
use crate::AppState;

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;
    let token = issue_token(&user)?;
    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

// Tokens are stateless; logout exists so clients have a uniform endpoint
// to drop their session against.
pub async fn logout() -> impl IntoResponse {
    Json(json!({ "message": "Logout successful" }))
}

pub async fn me(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(json!({ "user": UserResponse::from(user) }))
}
