//! Repository for the `enrollments` table.

use htw_core::curriculum::ProgressState;
use htw_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use htw_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::enrollment::{Enrollment, EnrollmentDetail, EnrollmentListParams};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, module_id, status, progress_percentage, completed_sections, \
                       total_sections, enrolled_at, last_accessed_at, completed_at, \
                       created_at, updated_at";

/// Enrollment columns plus learner and module names, for joined reads.
const DETAIL_COLUMNS: &str = "e.id, e.user_id, e.module_id, e.status, e.progress_percentage, \
                              e.completed_sections, e.total_sections, e.enrolled_at, \
                              e.last_accessed_at, e.completed_at, e.created_at, e.updated_at, \
                              u.username, u.email, m.title AS module_title";

const DETAIL_FROM: &str = "FROM enrollments e \
                           JOIN users u ON u.id = e.user_id \
                           JOIN modules m ON m.id = e.module_id";

/// Provides enrollment persistence and tracking queries.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a user in a module. A second enrollment for the same pair
    /// violates `uq_enrollments_user_module`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
        total_sections: i32,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (id, user_id, module_id, total_sections)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(DbId::new())
            .bind(user_id)
            .bind(module_id)
            .bind(total_sections)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EnrollmentDetail>, sqlx::Error> {
        let query = format!("SELECT {DETAIL_COLUMNS} {DETAIL_FROM} WHERE e.id = $1");
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered, paginated tracking list, most recent enrollment first.
    pub async fn list(
        pool: &PgPool,
        params: &EnrollmentListParams,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let offset = clamp_offset(params.offset);

        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_FROM}
             WHERE ($1::text IS NULL OR e.module_id = $1)
               AND ($2::text IS NULL OR e.user_id = $2)
               AND ($3::text IS NULL OR e.status = $3)
             ORDER BY e.enrolled_at DESC, e.id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(params.module_id)
            .bind(params.user_id)
            .bind(params.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_FROM}
             WHERE e.user_id = $1
             ORDER BY e.enrolled_at DESC, e.id"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Most recent enrollments across all modules.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_FROM}
             ORDER BY e.enrolled_at DESC, e.id
             LIMIT $1"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every enrollment, or those of one module, for in-memory analytics.
    pub async fn list_for_analytics(
        pool: &PgPool,
        module_id: Option<DbId>,
    ) -> Result<Vec<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments
             WHERE ($1::text IS NULL OR module_id = $1)"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(module_id)
            .fetch_all(pool)
            .await
    }

    /// Persist a computed progress state.
    ///
    /// `accessed_at` stamps `last_accessed_at` when given. Returns `None`
    /// if no row with the given `id` exists.
    pub async fn save_progress(
        pool: &PgPool,
        id: DbId,
        state: &ProgressState,
        accessed_at: Option<Timestamp>,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        write_progress(&mut *conn, id, state, accessed_at).await
    }

    /// Read-modify-write of an enrollment's progress under a row lock.
    ///
    /// The row is selected `FOR UPDATE`, `apply` computes the next state
    /// from it, and the result is written in the same transaction, so
    /// concurrent status and progress changes serialize. An error from
    /// `apply` rolls back. Returns the row before and after the change, or
    /// `None` if no row with the given `id` exists.
    pub async fn transition<F, E>(
        pool: &PgPool,
        id: DbId,
        accessed_at: Option<Timestamp>,
        apply: F,
    ) -> Result<Option<(Enrollment, Enrollment)>, E>
    where
        F: FnOnce(&Enrollment) -> Result<ProgressState, E>,
        E: From<sqlx::Error>,
    {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let next = apply(&current)?;
        let updated = write_progress(&mut *tx, id, &next, accessed_at)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;
        Ok(Some((current, updated)))
    }

    /// Delete an enrollment by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn write_progress(
    conn: &mut PgConnection,
    id: DbId,
    state: &ProgressState,
    accessed_at: Option<Timestamp>,
) -> Result<Option<Enrollment>, sqlx::Error> {
    let query = format!(
        "UPDATE enrollments SET
            status = $2,
            completed_sections = $3,
            total_sections = $4,
            progress_percentage = $5,
            completed_at = $6,
            last_accessed_at = COALESCE($7, last_accessed_at)
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Enrollment>(&query)
        .bind(id)
        .bind(state.status)
        .bind(state.completed_sections)
        .bind(state.total_sections)
        .bind(state.progress_percentage)
        .bind(state.completed_at)
        .bind(accessed_at)
        .fetch_optional(conn)
        .await
}
