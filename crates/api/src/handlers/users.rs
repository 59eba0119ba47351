//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use htw_core::error::CoreError;
use htw_core::types::DbId;
use htw_db::models::enrollment::EnrollmentDetail;
use htw_db::models::user::{CreateUser, User, UserListParams};
use htw_db::repositories::{EnrollmentRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery, IdPath};
use crate::response::{created, ApiResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    input.validate()?;
    if input.username.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "username must not be empty".into(),
        )));
    }

    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = %user.id, "User created");
    Ok(created(user, "User created successfully"))
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let users = UserRepo::list(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(user)))
}

/// GET /api/users/{id}/enrollments
pub async fn enrollments(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<Vec<EnrollmentDetail>>>> {
    if !UserRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }
    let enrollments = EnrollmentRepo::list_for_user(&state.pool, id).await?;
    Ok(Json(ApiResponse::ok(enrollments)))
}
