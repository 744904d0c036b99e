//! HTTP endpoint handlers for the Lumi bridge API.

#![allow(clippy::missing_errors_doc)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::content::ContentMetadata;
use crate::controller::{EditorContent, ExportResult, PickedFile, SavedContent};
use crate::error::Error;

use super::error::ApiResult;
use super::state::SharedState;

/// Update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// Content parameters
    pub parameters: serde_json::Value,
    /// Package metadata
    pub metadata: ContentMetadata,
    /// Main library ubername
    #[serde(default)]
    pub library: String,
    /// Content id; absent (or `"undefined"`) creates new content
    #[serde(default)]
    pub id: Option<String>,
}

/// Export request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Content to export
    pub content_id: String,
    /// Handle of a previous export to write to again
    #[serde(default)]
    pub file_handle_id: Option<String>,
}

/// Import request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Handle of the package to import
    pub file_handle_id: String,
}

/// GET /api/v1/lumi/content/{id} - Load content for the editor.
pub async fn get_content(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EditorContent>> {
    Ok(Json(state.controller.load_package(&id).await?))
}

/// DELETE /api/v1/lumi/content/{id} - Delete content.
pub async fn delete_content(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.controller.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/lumi/content - Create or update content.
pub async fn update_content(
    State(state): State<SharedState>,
    Json(request): Json<UpdateRequest>,
) -> ApiResult<Json<SavedContent>> {
    let saved = state
        .controller
        .update(
            request.parameters,
            request.metadata,
            request.library,
            request.id.as_deref(),
        )
        .await?;
    Ok(Json(saved))
}

/// POST /api/v1/lumi/export - Export content as a package.
pub async fn export_content(
    State(state): State<SharedState>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<Json<ExportResult>> {
    let result = state
        .controller
        .export(&request.content_id, request.file_handle_id.as_deref())
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/lumi/import - Import a package as new content.
pub async fn import_content(
    State(state): State<SharedState>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<SavedContent>> {
    Ok(Json(state.controller.import(&request.file_handle_id).await?))
}

/// POST /api/v1/lumi/pick/h5p - Let the user pick packages to import.
///
/// A cancelled dialog is answered as a user abort.
pub async fn pick_h5p_files(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<PickedFile>>> {
    let picked = state
        .controller
        .pick_h5p_files()
        .await?
        .ok_or(Error::UserAborted)?;
    Ok(Json(picked))
}

/// POST /api/v1/lumi/pick/css - Let the user pick a stylesheet.
pub async fn pick_css_file(State(state): State<SharedState>) -> ApiResult<Json<PickedFile>> {
    Ok(Json(state.controller.pick_css_file().await?))
}
