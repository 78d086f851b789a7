//! Document HTTP handlers: multipart upload batches and URL documents.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState};
use docket_core::{DocumentCategoryHint, DocumentRepository, FileUpload, UrlDocumentInput};

#[derive(Debug, Deserialize)]
pub struct AddUrlsBody {
    pub urls: Vec<UrlDocumentInput>,
}

/// Upload a batch of files to a case.
///
/// POST /api/v1/cases/:id/documents
///
/// Multipart form: repeated `files` parts carrying the file bytes, plus an
/// optional `categories` text part holding a JSON array of per-file category
/// hints in the same order as the files.
pub async fn upload_documents(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut files: Vec<FileUpload> = Vec::new();
    let mut hints: Vec<DocumentCategoryHint> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        match field.name() {
            Some("files") | Some("file") => {
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("upload-{}", files.len() + 1));
                let mime_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?
                    .to_vec();

                files.push(FileUpload {
                    file_name,
                    mime_type,
                    data,
                });
            }
            Some("categories") => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read categories: {}", e))
                })?;
                hints = serde_json::from_str(&raw).map_err(|e| {
                    ApiError::BadRequest(format!("Invalid categories payload: {}", e))
                })?;
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest(
            "No files uploaded. Use field name 'files'.".to_string(),
        ));
    }

    let batch = state.documents.upload_files(case_id, files, hints).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": batch,
        })),
    ))
}

/// Attach URL documents to a case.
///
/// POST /api/v1/cases/:id/documents/urls
pub async fn add_url_documents(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<AddUrlsBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.urls.is_empty() {
        return Err(ApiError::BadRequest("urls must not be empty".to_string()));
    }

    let outcomes = state.documents.add_urls(case_id, body.urls).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": outcomes,
        })),
    ))
}

/// List a case's documents in creation order.
///
/// GET /api/v1/cases/:id/documents
pub async fn list_documents(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = state.db.documents.list_for_case(case_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": documents,
    })))
}

/// Fetch a single document.
///
/// GET /api/v1/documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.db.documents.fetch(id).await?;

    Ok(Json(json!({
        "success": true,
        "data": document,
    })))
}
