use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use placelore_render::blocks::Block;
use placelore_render::sections::render_sections;

use crate::error::ApiError;
use crate::state::AppState;

const NOT_FOUND: &str = "Content not found";

#[derive(Serialize)]
pub struct ContentResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct SectionsResponse {
    pub success: bool,
    pub place: String,
    pub sections: Vec<Block>,
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(place): Path<String>,
) -> Result<Json<ContentResponse>, ApiError> {
    let record = state
        .service
        .lookup(&place)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(ContentResponse {
        success: true,
        message: record.content,
    }))
}

/// Stored content, segmented into headings, lists and paragraphs.
pub async fn get_sections(
    State(state): State<AppState>,
    Path(place): Path<String>,
) -> Result<Json<SectionsResponse>, ApiError> {
    let record = state
        .service
        .lookup(&place)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(SectionsResponse {
        success: true,
        sections: render_sections(&record.content),
        place: record.place,
    }))
}
