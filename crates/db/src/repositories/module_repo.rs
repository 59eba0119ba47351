//! Repository for the `modules` table.

use htw_core::types::DbId;
use sqlx::PgPool;

use crate::models::module::{CreateModule, Module, ModuleListParams, UpdateModule};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, phase_id, title, description, difficulty, color, topics, \
                       sort_order, is_active, created_at, updated_at";

/// Phase order first, then module order within the phase.
const ORDER_BY: &str = "ORDER BY (SELECT p.sort_order FROM phases p WHERE p.id = modules.phase_id), \
                        phase_id, sort_order, created_at";

/// Provides CRUD operations for modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a new module, returning the created row.
    ///
    /// `topics` should already be normalized.
    pub async fn create(pool: &PgPool, input: &CreateModule) -> Result<Module, sqlx::Error> {
        let query = format!(
            "INSERT INTO modules
                (id, phase_id, title, description, difficulty, color, topics, sort_order, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'beginner'), $6, $7, COALESCE($8, 0),
                     COALESCE($9, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(DbId::new())
            .bind(input.phase_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.difficulty)
            .bind(&input.color)
            .bind(input.topics.clone().unwrap_or_default())
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List modules, optionally within one phase. Inactive modules are
    /// skipped unless `include_inactive` is set.
    pub async fn list(pool: &PgPool, params: &ModuleListParams) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules
             WHERE ($1::text IS NULL OR phase_id = $1)
               AND ($2 OR is_active)
             {ORDER_BY}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(params.phase_id)
            .bind(params.include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_phase(
        pool: &PgPool,
        phase_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<Module>, sqlx::Error> {
        Self::list(
            pool,
            &ModuleListParams {
                phase_id: Some(phase_id),
                include_inactive,
            },
        )
        .await
    }

    /// Number of modules (active or not) owned by a phase.
    pub async fn count_by_phase(pool: &PgPool, phase_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM modules WHERE phase_id = $1")
            .bind(phase_id)
            .fetch_one(pool)
            .await
    }

    /// Update a module. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateModule,
    ) -> Result<Option<Module>, sqlx::Error> {
        let query = format!(
            "UPDATE modules SET
                phase_id = COALESCE($2, phase_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                difficulty = COALESCE($5, difficulty),
                color = COALESCE($6, color),
                topics = COALESCE($7, topics),
                sort_order = COALESCE($8, sort_order),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(input.phase_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.difficulty)
            .bind(&input.color)
            .bind(&input.topics)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a module and, through cascades, its content and enrollments.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM modules WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
