//! Aggregate queries for the admin dashboard.

use sqlx::PgPool;

use crate::models::dashboard::{DashboardTotals, DifficultyCount};

/// Read-only aggregates across the curriculum tables.
pub struct StatsRepo;

impl StatsRepo {
    /// Entity totals in a single round trip.
    pub async fn totals(pool: &PgPool) -> Result<DashboardTotals, sqlx::Error> {
        sqlx::query_as::<_, DashboardTotals>(
            "SELECT
                (SELECT COUNT(*) FROM phases) AS phases,
                (SELECT COUNT(*) FROM modules) AS modules,
                (SELECT COUNT(*) FROM modules WHERE is_active) AS active_modules,
                (SELECT COUNT(*) FROM content) AS content,
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM enrollments) AS enrollments,
                (SELECT COUNT(*) FROM enrollments WHERE status = 'active') AS active_enrollments,
                (SELECT COUNT(*) FROM enrollments WHERE status = 'completed') AS completed_enrollments,
                (SELECT COALESCE(SUM(duration_minutes), 0)::BIGINT FROM content) AS total_duration",
        )
        .fetch_one(pool)
        .await
    }

    /// Module count per difficulty. Levels with no modules are omitted.
    pub async fn difficulty_counts(pool: &PgPool) -> Result<Vec<DifficultyCount>, sqlx::Error> {
        sqlx::query_as::<_, DifficultyCount>(
            "SELECT difficulty, COUNT(*) AS count
             FROM modules
             GROUP BY difficulty
             ORDER BY difficulty",
        )
        .fetch_all(pool)
        .await
    }
}
