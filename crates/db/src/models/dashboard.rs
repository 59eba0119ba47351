//! Aggregate rows for the admin dashboard and module statistics.

use htw_core::curriculum::{ContentType, Difficulty};
use serde::Serialize;
use sqlx::FromRow;

/// Entity totals for the dashboard header cards.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub phases: i64,
    pub modules: i64,
    pub active_modules: i64,
    pub content: i64,
    pub users: i64,
    pub enrollments: i64,
    pub active_enrollments: i64,
    pub completed_enrollments: i64,
    pub total_duration: i64,
}

/// Content count and minutes for one content type.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeCount {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub count: i64,
    pub total_duration: i64,
}

/// Module count for one difficulty level.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyCount {
    pub difficulty: Difficulty,
    pub count: i64,
}
