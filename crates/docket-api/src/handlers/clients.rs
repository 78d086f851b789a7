//! Client HTTP handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, AppState};
use docket_core::{ClientRepository, UpdateClientRequest};

#[derive(Debug, Deserialize)]
pub struct UpdateClientBody {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Fetch a client.
///
/// GET /api/v1/clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let client = state.db.clients.fetch(id).await?;

    Ok(Json(json!({
        "success": true,
        "data": client,
    })))
}

/// Update a client's contact details.
///
/// PUT /api/v1/clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClientBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    let client = state
        .db
        .clients
        .update(
            id,
            UpdateClientRequest {
                name: body.name,
                email: body.email,
                phone: body.phone,
                address: body.address,
                updated_by: body.updated_by,
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": client,
    })))
}
