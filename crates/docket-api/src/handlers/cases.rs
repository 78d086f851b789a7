//! Case HTTP handlers: AI-assisted intake, listing, and detail reads.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState};
use docket_core::{CaseRepository, CreateCaseInput};

/// Create a client and case from AI extraction output.
///
/// POST /api/v1/cases
pub async fn create_case(
    State(state): State<AppState>,
    Json(input): Json<CreateCaseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let new_case = state.intake.create_case(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "case_id": new_case.case_id,
                "client_id": new_case.client_id,
            },
        })),
    ))
}

/// List all cases, newest first.
///
/// GET /api/v1/cases
pub async fn list_cases(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cases = state.db.cases.list().await?;

    Ok(Json(json!({
        "success": true,
        "data": cases,
    })))
}

/// Fetch a case with its client, documents, notes, and strategy versions.
///
/// GET /api/v1/cases/:id
pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let case = state.db.cases.fetch_full(id).await?;

    Ok(Json(json!({
        "success": true,
        "data": case,
    })))
}
