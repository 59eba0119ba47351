//! Handlers for the `/enrollments` resource and enrollment tracking.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use htw_core::curriculum::{apply_progress, apply_status};
use htw_core::enrollment_stats::{
    analyze, EnrollmentAnalytics, EnrollmentSnapshot, DEFAULT_VELOCITY_WINDOW_DAYS,
    MAX_VELOCITY_WINDOW_DAYS,
};
use htw_core::error::CoreError;
use htw_core::types::DbId;
use htw_db::models::enrollment::{
    AnalyticsParams, CreateEnrollment, Enrollment, EnrollmentDetail, EnrollmentListParams,
    RecordProgress, UpdateEnrollmentStatus,
};
use htw_db::repositories::{ContentRepo, EnrollmentRepo, ModuleRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery, IdPath};
use crate::response::{created, ApiResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Enrollment",
        id,
    })
}

/// POST /api/enrollments
///
/// `totalSections` defaults to the module's current content count.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateEnrollment>,
) -> AppResult<(StatusCode, Json<ApiResponse<Enrollment>>)> {
    input.validate()?;

    let (user_exists, module_exists) = tokio::try_join!(
        UserRepo::exists(&state.pool, input.user_id),
        ModuleRepo::exists(&state.pool, input.module_id),
    )?;
    if !user_exists {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {} does not exist",
            input.user_id
        ))));
    }
    if !module_exists {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Module {} does not exist",
            input.module_id
        ))));
    }

    let total_sections = match input.total_sections {
        Some(total) => total,
        None => {
            let count = ContentRepo::count_by_module(&state.pool, input.module_id).await?;
            i32::try_from(count).map_err(|_| {
                AppError::InternalError(format!("content count {count} out of range"))
            })?
        }
    };

    let enrollment =
        EnrollmentRepo::create(&state.pool, input.user_id, input.module_id, total_sections)
            .await?;
    tracing::info!(
        enrollment_id = %enrollment.id,
        user_id = %enrollment.user_id,
        module_id = %enrollment.module_id,
        total_sections,
        "User enrolled"
    );
    Ok(created(enrollment, "Enrolled successfully"))
}

/// GET /api/enrollments
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EnrollmentListParams>,
) -> AppResult<Json<ApiResponse<Vec<EnrollmentDetail>>>> {
    let enrollments = EnrollmentRepo::list(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(enrollments)))
}

/// GET /api/enrollments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<EnrollmentDetail>>> {
    let enrollment = EnrollmentRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(enrollment)))
}

/// DELETE /api/enrollments/{id}
pub async fn delete(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    if !EnrollmentRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(enrollment_id = %id, "Enrollment deleted");
    Ok(Json(ApiResponse::done("Enrollment deleted successfully")))
}

/// PUT /api/enrollments/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<UpdateEnrollmentStatus>,
) -> AppResult<Json<ApiResponse<Enrollment>>> {
    let (current, enrollment) =
        EnrollmentRepo::transition(&state.pool, id, None, |current| {
            Ok::<_, AppError>(apply_status(&current.progress_state(), input.status, Utc::now()))
        })
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        enrollment_id = %id,
        from = %current.status,
        to = %enrollment.status,
        "Enrollment status changed"
    );
    Ok(Json(ApiResponse::with_message(
        enrollment,
        "Enrollment status updated successfully",
    )))
}

/// PUT /api/enrollments/{id}/progress
///
/// Completing every section completes the enrollment. Dropped
/// enrollments are refused with 409.
pub async fn record_progress(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<RecordProgress>,
) -> AppResult<Json<ApiResponse<Enrollment>>> {
    input.validate()?;

    let now = Utc::now();
    let (_, enrollment) = EnrollmentRepo::transition(&state.pool, id, Some(now), |current| {
        let next = apply_progress(
            &current.progress_state(),
            input.completed_sections,
            input.total_sections,
            now,
        )?;
        Ok::<_, AppError>(next)
    })
    .await?
    .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::with_message(
        enrollment,
        "Progress recorded successfully",
    )))
}

/// GET /api/enrollments/analytics
pub async fn analytics(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AnalyticsParams>,
) -> AppResult<Json<ApiResponse<EnrollmentAnalytics>>> {
    let window_days = params
        .window_days
        .unwrap_or(DEFAULT_VELOCITY_WINDOW_DAYS)
        .clamp(1, MAX_VELOCITY_WINDOW_DAYS);

    if let Some(module_id) = params.module_id {
        if !ModuleRepo::exists(&state.pool, module_id).await? {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Module",
                id: module_id,
            }));
        }
    }

    let enrollments = EnrollmentRepo::list_for_analytics(&state.pool, params.module_id).await?;
    let snapshots: Vec<EnrollmentSnapshot> = enrollments.iter().map(Into::into).collect();

    Ok(Json(ApiResponse::ok(analyze(
        &snapshots,
        Utc::now(),
        window_days,
    ))))
}
