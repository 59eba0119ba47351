//! Handler for the admin dashboard summary.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use htw_core::enrollment_stats::completion_rate;
use htw_core::formatting::{format_date, format_duration, format_percentage, format_relative};
use htw_db::models::dashboard::{ContentTypeCount, DashboardTotals, DifficultyCount};
use htw_db::models::enrollment::EnrollmentDetail;
use htw_db::repositories::{ContentRepo, EnrollmentRepo, StatsRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::state::AppState;

/// How many recent enrollments the dashboard shows.
const RECENT_ENROLLMENTS: i64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEnrollment {
    #[serde(flatten)]
    pub detail: EnrollmentDetail,
    pub enrolled_on: String,
    pub enrolled_ago: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub totals: DashboardTotals,
    pub formatted_total_duration: String,
    pub completion_rate: f64,
    pub formatted_completion_rate: String,
    pub content_by_type: Vec<ContentTypeCount>,
    pub modules_by_difficulty: Vec<DifficultyCount>,
    pub recent_enrollments: Vec<RecentEnrollment>,
}

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let (totals, content_by_type, modules_by_difficulty, recent) = tokio::try_join!(
        StatsRepo::totals(&state.pool),
        ContentRepo::type_counts(&state.pool, None),
        StatsRepo::difficulty_counts(&state.pool),
        EnrollmentRepo::recent(&state.pool, RECENT_ENROLLMENTS),
    )?;

    let now = Utc::now();
    let rate = completion_rate(
        usize::try_from(totals.completed_enrollments).unwrap_or(0),
        usize::try_from(totals.enrollments).unwrap_or(0),
    );

    let recent_enrollments = recent
        .into_iter()
        .map(|detail| RecentEnrollment {
            enrolled_on: format_date(detail.enrollment.enrolled_at),
            enrolled_ago: format_relative(detail.enrollment.enrolled_at, now),
            detail,
        })
        .collect();

    Ok(Json(ApiResponse::ok(DashboardStats {
        formatted_total_duration: format_duration(totals.total_duration),
        totals,
        completion_rate: rate,
        formatted_completion_rate: format_percentage(rate),
        content_by_type,
        modules_by_difficulty,
        recent_enrollments,
    })))
}
