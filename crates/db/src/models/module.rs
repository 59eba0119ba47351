//! Curriculum module models and DTOs.

use htw_core::curriculum::Difficulty;
use htw_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: DbId,
    pub phase_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub color: Option<String>,
    pub topics: Vec<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateModule {
    pub phase_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub color: Option<String>,
    pub topics: Option<Vec<String>>,
    #[serde(rename = "order")]
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Patch for a module. `phaseId` moves the module to another phase.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModule {
    pub phase_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub color: Option<String>,
    pub topics: Option<Vec<String>>,
    #[serde(rename = "order")]
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Query parameters for `GET /modules`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleListParams {
    pub phase_id: Option<DbId>,
    #[serde(default)]
    pub include_inactive: bool,
}

