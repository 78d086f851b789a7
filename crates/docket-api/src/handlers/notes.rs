//! Case note HTTP handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState};
use docket_core::{CaseNoteRepository, CreateCaseNoteRequest, UpdateCaseNoteRequest};

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Create a note on a case.
///
/// POST /api/v1/cases/:id/notes
pub async fn create_note(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<CreateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "content must not be empty".to_string(),
        ));
    }

    let note = state
        .db
        .notes
        .create(CreateCaseNoteRequest {
            case_id,
            title: body.title,
            content: body.content,
            created_by: body.created_by,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": note,
        })),
    ))
}

/// List a case's notes, newest first.
///
/// GET /api/v1/cases/:id/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.db.notes.list_for_case(case_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": notes,
    })))
}

/// Update a note's title and content.
///
/// PATCH /api/v1/notes/:id
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "content must not be empty".to_string(),
        ));
    }

    let note = state
        .db
        .notes
        .update(
            id,
            UpdateCaseNoteRequest {
                title: body.title,
                content: body.content,
                updated_by: body.updated_by,
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": note,
    })))
}

/// Delete a note.
///
/// DELETE /api/v1/notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.notes.delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Note deleted",
    })))
}
