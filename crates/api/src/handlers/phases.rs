//! Handlers for the `/phases` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use htw_core::curriculum::{validate_color, validate_title};
use htw_core::error::CoreError;
use htw_core::types::DbId;
use htw_db::models::module::Module;
use htw_db::models::phase::{CreatePhase, Phase, PhaseWithCounts, UpdatePhase};
use htw_db::repositories::{ModuleRepo, PhaseRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery, IdPath};
use crate::query::IncludeInactiveParams;
use crate::response::{created, ApiResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Phase", id })
}

/// POST /api/phases
pub async fn create(
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<CreatePhase>,
) -> AppResult<(StatusCode, Json<ApiResponse<Phase>>)> {
    input.validate()?;
    input.title = validate_title(&input.title)?;
    validate_color(input.color.as_deref())?;

    let phase = PhaseRepo::create(&state.pool, &input).await?;
    tracing::info!(phase_id = %phase.id, title = %phase.title, "Phase created");
    Ok(created(phase, "Phase created successfully"))
}

/// GET /api/phases
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PhaseWithCounts>>>> {
    let phases = PhaseRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::ok(phases)))
}

/// GET /api/phases/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<Phase>>> {
    let phase = PhaseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(phase)))
}

/// PUT /api/phases/{id}
pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(mut input): ApiJson<UpdatePhase>,
) -> AppResult<Json<ApiResponse<Phase>>> {
    input.validate()?;
    if let Some(title) = &input.title {
        input.title = Some(validate_title(title)?);
    }
    validate_color(input.color.as_deref())?;

    let phase = PhaseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::with_message(phase, "Phase updated successfully")))
}

/// DELETE /api/phases/{id}
///
/// Refused while the phase still owns modules.
pub async fn delete(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    let modules = ModuleRepo::count_by_phase(&state.pool, id).await?;
    if modules > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Phase still has {modules} module(s); delete or move them first"
        ))));
    }

    if !PhaseRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(phase_id = %id, "Phase deleted");
    Ok(Json(ApiResponse::done("Phase deleted successfully")))
}

/// GET /api/phases/{id}/modules
pub async fn list_modules(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiQuery(params): ApiQuery<IncludeInactiveParams>,
) -> AppResult<Json<ApiResponse<Vec<Module>>>> {
    if !PhaseRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }
    let modules = ModuleRepo::list_by_phase(&state.pool, id, params.include_inactive).await?;
    Ok(Json(ApiResponse::ok(modules)))
}
