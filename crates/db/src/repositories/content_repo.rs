//! Repository for the `content` table.

use htw_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use htw_core::types::DbId;
use sqlx::PgPool;

use super::contains_pattern;
use crate::models::content::{Content, ContentListParams, CreateContent, UpdateContent};
use crate::models::dashboard::ContentTypeCount;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, module_id, content_type, title, description, url, instructions, \
                       duration_minutes, section, sort_order, created_at, updated_at";

/// Provides CRUD operations for module content.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert a new content item, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateContent) -> Result<Content, sqlx::Error> {
        let query = format!(
            "INSERT INTO content
                (id, module_id, content_type, title, description, url, instructions,
                 duration_minutes, section, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(DbId::new())
            .bind(input.module_id)
            .bind(input.content_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.url)
            .bind(&input.instructions)
            .bind(input.duration_minutes)
            .bind(&input.section)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content WHERE id = $1");
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All content of one module in display order.
    ///
    /// An unknown module yields an empty list.
    pub async fn list_by_module(pool: &PgPool, module_id: DbId) -> Result<Vec<Content>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content
             WHERE module_id = $1
             ORDER BY sort_order, created_at"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(module_id)
            .fetch_all(pool)
            .await
    }

    /// Filtered, paginated listing for the content manager.
    pub async fn list(pool: &PgPool, params: &ContentListParams) -> Result<Vec<Content>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let offset = clamp_offset(params.offset);
        let pattern = params
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(contains_pattern);

        let query = format!(
            "SELECT {COLUMNS} FROM content
             WHERE ($1::text IS NULL OR module_id = $1)
               AND ($2::text IS NULL OR content_type = $2)
               AND ($3::text IS NULL OR title ILIKE $3 OR description ILIKE $3)
             ORDER BY module_id, sort_order, created_at
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(params.module_id)
            .bind(params.content_type)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a content item. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContent,
    ) -> Result<Option<Content>, sqlx::Error> {
        let query = format!(
            "UPDATE content SET
                content_type = COALESCE($2, content_type),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                url = COALESCE($5, url),
                instructions = COALESCE($6, instructions),
                duration_minutes = COALESCE($7, duration_minutes),
                section = COALESCE($8, section),
                sort_order = COALESCE($9, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .bind(input.content_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.url)
            .bind(&input.instructions)
            .bind(input.duration_minutes)
            .bind(&input.section)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a content item by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_module(pool: &PgPool, module_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM content WHERE module_id = $1")
            .bind(module_id)
            .fetch_one(pool)
            .await
    }

    /// Count and total minutes per content type, across every module or
    /// within one. Types with no content are omitted.
    pub async fn type_counts(
        pool: &PgPool,
        module_id: Option<DbId>,
    ) -> Result<Vec<ContentTypeCount>, sqlx::Error> {
        sqlx::query_as::<_, ContentTypeCount>(
            "SELECT content_type,
                    COUNT(*) AS count,
                    COALESCE(SUM(duration_minutes), 0)::BIGINT AS total_duration
             FROM content
             WHERE ($1::text IS NULL OR module_id = $1)
             GROUP BY content_type
             ORDER BY content_type",
        )
        .bind(module_id)
        .fetch_all(pool)
        .await
    }
}
