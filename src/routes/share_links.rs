use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::dto::share_dto::CreateShareLinkPayload;
use crate::error::Result;
use crate::models::user::User;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_share_link(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(resume_id): Path<Uuid>,
    Json(payload): Json<CreateShareLinkPayload>,
) -> Result<impl IntoResponse> {
    let share_link = state
        .share_service
        .create(&actor, resume_id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Share link created successfully",
            "share_link": share_link
        })),
    ))
}

/// Public, unauthenticated: validity comes from the token alone.
#[axum::debug_handler]
pub async fn resolve_share_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let response = state.share_service.resolve(&token).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn revoke_share_link(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let share_link = state.share_service.revoke(&actor, id).await?;
    Ok(Json(json!({
        "message": "Share link revoked successfully",
        "share_link": share_link
    })))
}

#[axum::debug_handler]
pub async fn list_share_links(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(resume_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let response = state.share_service.list(&actor, resume_id).await?;
    Ok(Json(response))
}
