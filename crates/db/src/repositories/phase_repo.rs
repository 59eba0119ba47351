//! Repository for the `phases` table.

use htw_core::types::DbId;
use sqlx::PgPool;

use crate::models::phase::{CreatePhase, Phase, PhaseWithCounts, UpdatePhase};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, icon, color, sort_order, created_at, updated_at";

/// Provides CRUD operations for phases.
pub struct PhaseRepo;

impl PhaseRepo {
    /// Insert a new phase, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePhase) -> Result<Phase, sqlx::Error> {
        let query = format!(
            "INSERT INTO phases (id, title, description, icon, color, sort_order)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Phase>(&query)
            .bind(DbId::new())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.icon)
            .bind(&input.color)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Phase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM phases WHERE id = $1");
        sqlx::query_as::<_, Phase>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List phases in display order with their module counts.
    pub async fn list(pool: &PgPool) -> Result<Vec<PhaseWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS},
                    (SELECT COUNT(*) FROM modules m WHERE m.phase_id = phases.id) AS module_count,
                    (SELECT COUNT(*) FROM modules m
                      WHERE m.phase_id = phases.id AND m.is_active) AS active_module_count
             FROM phases
             ORDER BY sort_order, created_at"
        );
        sqlx::query_as::<_, PhaseWithCounts>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a phase. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePhase,
    ) -> Result<Option<Phase>, sqlx::Error> {
        let query = format!(
            "UPDATE phases SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                icon = COALESCE($4, icon),
                color = COALESCE($5, color),
                sort_order = COALESCE($6, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Phase>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.icon)
            .bind(&input.color)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a phase by ID. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign key violation while modules still reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM phases WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM phases WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
