//! Handlers for the `/content` resource, including the learner-facing
//! per-module read.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use htw_core::curriculum::{validate_content_source, validate_title};
use htw_core::error::CoreError;
use htw_core::types::DbId;
use htw_db::models::content::{
    group_by_section, Content, ContentListParams, ContentSection, CreateContent, UpdateContent,
};
use htw_db::repositories::{ContentRepo, ModuleRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery, IdPath};
use crate::response::{created, ApiResponse};
use crate::state::AppState;

/// Payload of `GET /content/module/{moduleId}`.
#[derive(Debug, Serialize)]
pub struct ModuleContent {
    pub content: Vec<Content>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Content", id })
}

/// POST /api/content
pub async fn create(
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<CreateContent>,
) -> AppResult<(StatusCode, Json<ApiResponse<Content>>)> {
    input.validate()?;
    input.title = validate_title(&input.title)?;
    validate_content_source(
        input.content_type,
        input.url.as_deref(),
        input.instructions.as_deref(),
    )?;
    if !ModuleRepo::exists(&state.pool, input.module_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Module {} does not exist",
            input.module_id
        ))));
    }

    let content = ContentRepo::create(&state.pool, &input).await?;
    tracing::info!(
        content_id = %content.id,
        module_id = %content.module_id,
        content_type = %content.content_type,
        "Content created"
    );
    Ok(created(content, "Content created successfully"))
}

/// GET /api/content
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ContentListParams>,
) -> AppResult<Json<ApiResponse<Vec<Content>>>> {
    let items = ContentRepo::list(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/content/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<Content>>> {
    let content = ContentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(content)))
}

/// PUT /api/content/{id}
///
/// The merged record must still have a usable source.
pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(mut input): ApiJson<UpdateContent>,
) -> AppResult<Json<ApiResponse<Content>>> {
    input.validate()?;
    if let Some(title) = &input.title {
        input.title = Some(validate_title(title)?);
    }

    let existing = ContentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    validate_content_source(
        input.content_type.unwrap_or(existing.content_type),
        input.url.as_deref().or(existing.url.as_deref()),
        input
            .instructions
            .as_deref()
            .or(existing.instructions.as_deref()),
    )?;

    let content = ContentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::with_message(content, "Content updated successfully")))
}

/// DELETE /api/content/{id}
pub async fn delete(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    if !ContentRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(content_id = %id, "Content deleted");
    Ok(Json(ApiResponse::done("Content deleted successfully")))
}

/// GET /api/content/module/{moduleId}
///
/// Learner read, rate limited per client. An unknown module yields an
/// empty list rather than 404.
pub async fn by_module(
    State(state): State<AppState>,
    IdPath(module_id): IdPath,
) -> AppResult<Json<ApiResponse<ModuleContent>>> {
    let content = ContentRepo::list_by_module(&state.pool, module_id).await?;
    tracing::debug!(module_id = %module_id, count = content.len(), "Module content read");
    Ok(Json(ApiResponse::with_message(
        ModuleContent { content },
        "Content retrieved successfully",
    )))
}

/// GET /api/content/module/{moduleId}/sections
pub async fn sections(
    State(state): State<AppState>,
    IdPath(module_id): IdPath,
) -> AppResult<Json<ApiResponse<Vec<ContentSection>>>> {
    let content = ContentRepo::list_by_module(&state.pool, module_id).await?;
    Ok(Json(ApiResponse::ok(group_by_section(content))))
}
