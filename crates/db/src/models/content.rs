//! Learning content models, DTOs and section grouping.

use htw_core::curriculum::{section_or_default, ContentType};
use htw_core::formatting::format_duration;
use htw_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `content` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: DbId,
    pub module_id: DbId,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub instructions: Option<String>,
    #[serde(rename = "duration")]
    pub duration_minutes: Option<i32>,
    pub section: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContent {
    pub module_id: DbId,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    pub instructions: Option<String>,
    #[serde(rename = "duration")]
    #[validate(range(min = 0))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 100))]
    pub section: Option<String>,
    #[serde(rename = "order")]
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

/// Patch for a content item. The owning module cannot change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContent {
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    pub instructions: Option<String>,
    #[serde(rename = "duration")]
    #[validate(range(min = 0))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 100))]
    pub section: Option<String>,
    #[serde(rename = "order")]
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

/// Query parameters for `GET /content`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListParams {
    pub module_id: Option<DbId>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    /// Case-insensitive substring match on title and description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Section grouping
// ---------------------------------------------------------------------------

/// Content items sharing a section label, in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    pub section: String,
    pub total_duration: i64,
    pub formatted_duration: String,
    pub items: Vec<Content>,
}

/// Group already-ordered content by section.
///
/// Sections appear in the order of their first item. Items without a
/// section fall under the default section label.
pub fn group_by_section(items: Vec<Content>) -> Vec<ContentSection> {
    let mut sections: Vec<ContentSection> = Vec::new();

    for item in items {
        let label = section_or_default(item.section.as_deref()).to_string();
        let minutes = i64::from(item.duration_minutes.unwrap_or(0));

        match sections.iter_mut().find(|s| s.section == label) {
            Some(section) => {
                section.total_duration += minutes;
                section.items.push(item);
            }
            None => sections.push(ContentSection {
                section: label,
                total_duration: minutes,
                formatted_duration: String::new(),
                items: vec![item],
            }),
        }
    }

    for section in &mut sections {
        section.formatted_duration = format_duration(section.total_duration);
    }
    sections
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(title: &str, section: Option<&str>, minutes: Option<i32>) -> Content {
        let now = Utc::now();
        Content {
            id: DbId::new(),
            module_id: DbId::new(),
            content_type: ContentType::Video,
            title: title.to_string(),
            description: None,
            url: Some("https://example.com/v".into()),
            instructions: None,
            duration_minutes: minutes,
            section: section.map(str::to_string),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn groups_by_first_appearance() {
        let sections = group_by_section(vec![
            item("intro", Some("Basics"), Some(10)),
            item("recon", Some("Recon"), Some(50)),
            item("setup", Some("Basics"), Some(15)),
        ]);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section, "Basics");
        assert_eq!(sections[0].items.len(), 2);
        assert_eq!(sections[0].total_duration, 25);
        assert_eq!(sections[0].formatted_duration, "25m");
        assert_eq!(sections[1].section, "Recon");
    }

    #[test]
    fn missing_section_uses_default_label() {
        let sections = group_by_section(vec![
            item("a", None, None),
            item("b", Some("  "), Some(65)),
        ]);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section, "General");
        assert_eq!(sections[0].formatted_duration, "1h 5m");
    }

    #[test]
    fn empty_input_yields_no_sections() {
        assert!(group_by_section(Vec::new()).is_empty());
    }
}
