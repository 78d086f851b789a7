//! Strategy HTTP handlers: generation, manual edits, and version history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState};
use docket_core::{ContentType, StrategyRepository};
use docket_workflow::EditStrategyInput;

#[derive(Debug, Deserialize, Default)]
pub struct GenerateStrategyBody {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditStrategyBody {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub previous_version: Option<i32>,
    pub content_type: ContentType,
}

#[derive(Debug, Deserialize)]
pub struct DiffQuery {
    pub from: i32,
    pub to: i32,
}

/// Generate a new strategy version for a case.
///
/// POST /api/v1/cases/:id/strategy
pub async fn generate_strategy(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<GenerateStrategyBody>,
) -> Result<impl IntoResponse, ApiError> {
    let strategy = state.strategy.generate(case_id, body.reason).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": strategy,
        })),
    ))
}

/// Append a manually edited strategy version.
///
/// PUT /api/v1/cases/:id/strategy
pub async fn edit_strategy(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<EditStrategyBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "content must not be empty".to_string(),
        ));
    }

    let strategy = state
        .strategy
        .edit(
            case_id,
            EditStrategyInput {
                content: body.content,
                title: body.title,
                previous_version: body.previous_version,
                content_type: body.content_type,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": strategy,
        })),
    ))
}

/// Fetch the current (highest-version) strategy for a case.
///
/// GET /api/v1/cases/:id/strategy
pub async fn current_strategy(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let strategy = state
        .db
        .strategies
        .current(case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No strategy for case {}", case_id)))?;

    Ok(Json(json!({
        "success": true,
        "data": strategy,
    })))
}

/// List a case's strategy versions, highest first.
///
/// GET /api/v1/cases/:id/strategy/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let versions = state.db.strategies.list_versions(case_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": versions,
    })))
}

/// Fetch one strategy version with its full content.
///
/// GET /api/v1/cases/:id/strategy/versions/:version
pub async fn get_version(
    State(state): State<AppState>,
    Path((case_id, version)): Path<(Uuid, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    let strategy = state
        .db
        .strategies
        .get_version(case_id, version)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Strategy v{} not found for case {}", version, case_id))
        })?;

    Ok(Json(json!({
        "success": true,
        "data": strategy,
    })))
}

/// Unified diff between two strategy versions.
///
/// GET /api/v1/cases/:id/strategy/diff?from=1&to=2
pub async fn diff_versions(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Query(query): Query<DiffQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let diff = state
        .db
        .strategies
        .diff_versions(case_id, query.from, query.to)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "from": query.from,
            "to": query.to,
            "diff": diff,
        },
    })))
}
