//! Handlers for the `/modules` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use htw_core::curriculum::{normalize_topics, validate_color, validate_title};
use htw_core::enrollment_stats::{count_at_risk, summarize_module, EnrollmentSnapshot, ModuleEnrollmentSummary};
use htw_core::error::CoreError;
use htw_core::formatting::format_duration;
use htw_core::types::DbId;
use htw_db::models::dashboard::ContentTypeCount;
use htw_db::models::module::{CreateModule, Module, ModuleListParams, UpdateModule};
use htw_db::repositories::{ContentRepo, EnrollmentRepo, ModuleRepo, PhaseRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery, IdPath};
use crate::response::{created, ApiResponse};
use crate::state::AppState;

/// Content and enrollment figures for one module.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    pub module: Module,
    pub content_count: i64,
    pub total_duration: i64,
    pub formatted_duration: String,
    pub content_by_type: Vec<ContentTypeCount>,
    pub enrollments: ModuleEnrollmentSummary,
    pub at_risk: usize,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Module", id })
}

async fn ensure_phase(state: &AppState, phase_id: DbId) -> AppResult<()> {
    if PhaseRepo::exists(&state.pool, phase_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Phase {phase_id} does not exist"
        ))))
    }
}

/// POST /api/modules
pub async fn create(
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<CreateModule>,
) -> AppResult<(StatusCode, Json<ApiResponse<Module>>)> {
    input.validate()?;
    input.title = validate_title(&input.title)?;
    validate_color(input.color.as_deref())?;
    if let Some(topics) = &input.topics {
        input.topics = Some(normalize_topics(topics)?);
    }
    ensure_phase(&state, input.phase_id).await?;

    let module = ModuleRepo::create(&state.pool, &input).await?;
    tracing::info!(module_id = %module.id, phase_id = %module.phase_id, "Module created");
    Ok(created(module, "Module created successfully"))
}

/// GET /api/modules
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ModuleListParams>,
) -> AppResult<Json<ApiResponse<Vec<Module>>>> {
    let modules = ModuleRepo::list(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(modules)))
}

/// GET /api/modules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<Module>>> {
    let module = ModuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(module)))
}

/// PUT /api/modules/{id}
pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(mut input): ApiJson<UpdateModule>,
) -> AppResult<Json<ApiResponse<Module>>> {
    input.validate()?;
    if let Some(title) = &input.title {
        input.title = Some(validate_title(title)?);
    }
    validate_color(input.color.as_deref())?;
    if let Some(topics) = &input.topics {
        input.topics = Some(normalize_topics(topics)?);
    }
    if let Some(phase_id) = input.phase_id {
        ensure_phase(&state, phase_id).await?;
    }

    let module = ModuleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::with_message(module, "Module updated successfully")))
}

/// DELETE /api/modules/{id}
///
/// Content and enrollments of the module go with it.
pub async fn delete(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    if !ModuleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(module_id = %id, "Module deleted");
    Ok(Json(ApiResponse::done("Module deleted successfully")))
}

/// GET /api/modules/{id}/stats
pub async fn stats(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<ModuleStats>>> {
    let module = ModuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let (content_by_type, enrollments) = tokio::try_join!(
        ContentRepo::type_counts(&state.pool, Some(id)),
        EnrollmentRepo::list_for_analytics(&state.pool, Some(id)),
    )?;

    let snapshots: Vec<EnrollmentSnapshot> = enrollments.iter().map(Into::into).collect();
    let content_count = content_by_type.iter().map(|c| c.count).sum();
    let total_duration = content_by_type.iter().map(|c| c.total_duration).sum();

    Ok(Json(ApiResponse::ok(ModuleStats {
        module,
        content_count,
        total_duration,
        formatted_duration: format_duration(total_duration),
        content_by_type,
        enrollments: summarize_module(id, &snapshots),
        at_risk: count_at_risk(&snapshots, Utc::now()),
    })))
}
