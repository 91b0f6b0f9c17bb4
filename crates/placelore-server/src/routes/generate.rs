use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::service::ContentSource;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub place: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub content: String,
    /// True when the content was already stored and no generation ran.
    pub cached: bool,
}

/// Return stored content for a place, generating it first on a miss.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = payload?;
    let place = req.place.unwrap_or_default();

    let content = state.service.generate(&place).await?;

    Ok(Json(GenerateResponse {
        success: true,
        cached: content.source == ContentSource::Stored,
        content: content.text,
    }))
}
