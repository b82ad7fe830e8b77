use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::resume_dto::{AssignResumePayload, ResumeListQuery, UpdateResumePayload};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::resume_service::ResumeUpload;
use crate::AppState;

#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut name = None;
    let mut email = None;
    let mut phone = None;
    let mut skills = Vec::new();
    let mut notes = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "resume".to_string());
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                file = Some((file_name, mime_type, field.bytes().await?));
            }
            "name" => name = Some(field.text().await?),
            "email" => email = Some(field.text().await?),
            "phone" => phone = Some(field.text().await?),
            "skills" => {
                skills = field
                    .text()
                    .await?
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "notes" => notes = Some(field.text().await?),
            _ => {}
        }
    }

    let (file_name, mime_type, bytes) =
        file.ok_or_else(|| Error::BadRequest("Resume file is required".to_string()))?;
    let upload = ResumeUpload {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        phone,
        skills,
        notes,
        file_name,
        mime_type,
        bytes,
    };

    let resume = state.resume_service.upload(&actor, upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Resume uploaded successfully",
            "resume": resume
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_resumes(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Query(query): Query<ResumeListQuery>,
) -> Result<impl IntoResponse> {
    let response = state.resume_service.list(&actor, query).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn get_resume(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let resume = state.resume_service.get(&actor, id).await?;
    Ok(Json(json!({ "resume": resume })))
}

#[axum::debug_handler]
pub async fn update_resume(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateResumePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let resume = state.resume_service.update(&actor, id, payload).await?;
    Ok(Json(json!({
        "message": "Resume updated successfully",
        "resume": resume
    })))
}

#[axum::debug_handler]
pub async fn assign_resume(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignResumePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let resume = state
        .resume_service
        .assign(&actor, id, &payload.username)
        .await?;
    Ok(Json(json!({
        "message": format!("Resume assigned to {}", payload.username),
        "resume": resume
    })))
}

#[axum::debug_handler]
pub async fn get_file_url(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let response = state.resume_service.file_url(&actor, id).await?;
    Ok(Json(response))
}
