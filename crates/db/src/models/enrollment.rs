//! Module enrollment models and DTOs.

use htw_core::curriculum::{EnrollmentStatus, ProgressState};
use htw_core::enrollment_stats::EnrollmentSnapshot;
use htw_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: DbId,
    pub user_id: DbId,
    pub module_id: DbId,
    pub status: EnrollmentStatus,
    pub progress_percentage: i32,
    pub completed_sections: i32,
    pub total_sections: i32,
    pub enrolled_at: Timestamp,
    pub last_accessed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Enrollment {
    /// The fields progress rules operate on.
    pub fn progress_state(&self) -> ProgressState {
        ProgressState {
            status: self.status,
            completed_sections: self.completed_sections,
            total_sections: self.total_sections,
            progress_percentage: self.progress_percentage,
            completed_at: self.completed_at,
        }
    }
}

impl From<&Enrollment> for EnrollmentSnapshot {
    fn from(e: &Enrollment) -> Self {
        EnrollmentSnapshot {
            module_id: e.module_id,
            status: e.status,
            progress_percentage: e.progress_percentage,
            enrolled_at: e.enrolled_at,
            last_accessed_at: e.last_accessed_at,
            completed_at: e.completed_at,
        }
    }
}

/// Enrollment joined with the learner and module it links, for the
/// tracking table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub username: String,
    pub email: String,
    pub module_title: String,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Enroll a learner in a module.
///
/// `totalSections` defaults to the module's current content count.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollment {
    pub user_id: DbId,
    pub module_id: DbId,
    #[validate(range(min = 0))]
    pub total_sections: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentStatus {
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordProgress {
    #[validate(range(min = 0))]
    pub completed_sections: i32,
    #[validate(range(min = 0))]
    pub total_sections: Option<i32>,
}

/// Query parameters for `GET /enrollments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentListParams {
    pub module_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub status: Option<EnrollmentStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /enrollments/analytics`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub module_id: Option<DbId>,
    pub window_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn snapshot_carries_tracking_fields() {
        let now = Utc::now();
        let e = Enrollment {
            id: DbId::new(),
            user_id: DbId::new(),
            module_id: DbId::new(),
            status: EnrollmentStatus::Paused,
            progress_percentage: 40,
            completed_sections: 2,
            total_sections: 5,
            enrolled_at: now,
            last_accessed_at: Some(now),
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let snap = EnrollmentSnapshot::from(&e);
        assert_eq!(snap.module_id, e.module_id);
        assert_eq!(snap.status, EnrollmentStatus::Paused);
        assert_eq!(snap.progress_percentage, 40);

        let state = e.progress_state();
        assert_eq!(state.completed_sections, 2);
        assert_eq!(state.total_sections, 5);
    }

    #[test]
    fn serializes_camel_case() {
        let now = Utc::now();
        let e = Enrollment {
            id: DbId::new(),
            user_id: DbId::new(),
            module_id: DbId::new(),
            status: EnrollmentStatus::Active,
            progress_percentage: 0,
            completed_sections: 0,
            total_sections: 3,
            enrolled_at: now,
            last_accessed_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["totalSections"], 3);
        assert!(json.get("progressPercentage").is_some());
    }
}
