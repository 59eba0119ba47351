//! Curriculum vocabulary and validation rules.
//!
//! Phases contain modules, modules contain content items, and learners
//! enroll in modules. This module holds the closed vocabularies (difficulty,
//! content type, enrollment status), the field rules applied before any
//! write, and the progress arithmetic for enrollments.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a phase, module or content title after trimming.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum number of topics attached to a module.
pub const MAX_TOPICS: usize = 50;

/// Section label used for content that has no explicit section.
pub const DEFAULT_SECTION: &str = "General";

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Difficulty level of a module.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        }
    }

    /// Badge color (hex) used by the console.
    pub fn badge_color(self) -> &'static str {
        match self {
            Self::Beginner => "#22c55e",
            Self::Intermediate => "#eab308",
            Self::Advanced => "#f97316",
            Self::Expert => "#ef4444",
        }
    }
}

impl FromStr for Difficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| invalid_choice("difficulty", s, Self::ALL.map(Self::as_str)))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_text_column!(Difficulty);

// ---------------------------------------------------------------------------
// Content type
// ---------------------------------------------------------------------------

/// Kind of learning asset inside a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Lab,
    Game,
    Document,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Video,
        ContentType::Lab,
        ContentType::Game,
        ContentType::Document,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Lab => "lab",
            Self::Game => "game",
            Self::Document => "document",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Lab => "Lab",
            Self::Game => "Game",
            Self::Document => "Document",
        }
    }

    pub fn badge_color(self) -> &'static str {
        match self {
            Self::Video => "#3b82f6",
            Self::Lab => "#22c55e",
            Self::Game => "#a855f7",
            Self::Document => "#64748b",
        }
    }

    /// Whether items of this type can only be opened through a URL.
    pub fn requires_url(self) -> bool {
        matches!(self, Self::Video | Self::Game)
    }
}

impl FromStr for ContentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| invalid_choice("content type", s, Self::ALL.map(Self::as_str)))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_text_column!(ContentType);

// ---------------------------------------------------------------------------
// Enrollment status
// ---------------------------------------------------------------------------

/// Lifecycle state of an enrollment.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Completed,
    Paused,
    Dropped,
}

impl EnrollmentStatus {
    pub const ALL: [EnrollmentStatus; 4] = [
        EnrollmentStatus::Active,
        EnrollmentStatus::Completed,
        EnrollmentStatus::Paused,
        EnrollmentStatus::Dropped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Paused => "paused",
            Self::Dropped => "dropped",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
            Self::Dropped => "Dropped",
        }
    }

    pub fn badge_color(self) -> &'static str {
        match self {
            Self::Active => "#3b82f6",
            Self::Completed => "#22c55e",
            Self::Paused => "#eab308",
            Self::Dropped => "#ef4444",
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| invalid_choice("status", s, Self::ALL.map(Self::as_str)))
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_text_column!(EnrollmentStatus);

fn invalid_choice(field: &str, value: &str, allowed: [&str; 4]) -> CoreError {
    CoreError::Validation(format!(
        "Invalid {field} '{value}'. Must be one of: {}",
        allowed.join(", ")
    ))
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Trim a title and check it is non-empty and at most [`MAX_TITLE_LEN`] chars.
pub fn validate_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Colors are CSS hex literals: `#RGB` or `#RRGGBB`.
pub fn validate_color(color: Option<&str>) -> Result<(), CoreError> {
    match color {
        Some(c) if !COLOR_RE.is_match(c) => Err(CoreError::Validation(format!(
            "color '{c}' must be a hex color like #1a2b3c"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_order(order: i32) -> Result<(), CoreError> {
    if order < 0 {
        return Err(CoreError::Validation("order must not be negative".into()));
    }
    Ok(())
}

pub fn validate_duration(minutes: Option<i32>) -> Result<(), CoreError> {
    match minutes {
        Some(m) if m < 0 => Err(CoreError::Validation(
            "duration must not be negative".into(),
        )),
        _ => Ok(()),
    }
}

/// Trim topics, drop empty entries and duplicates (first occurrence wins).
pub fn normalize_topics(topics: &[String]) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(topics.len());
    for topic in topics {
        let t = topic.trim();
        if t.is_empty() || out.iter().any(|seen| seen.eq_ignore_ascii_case(t)) {
            continue;
        }
        out.push(t.to_string());
    }
    if out.len() > MAX_TOPICS {
        return Err(CoreError::Validation(format!(
            "a module may have at most {MAX_TOPICS} topics"
        )));
    }
    Ok(out)
}

/// Content must be reachable: a URL, instructions, or both.
///
/// Videos and games are only playable from a URL.
pub fn validate_content_source(
    content_type: ContentType,
    url: Option<&str>,
    instructions: Option<&str>,
) -> Result<(), CoreError> {
    let has_url = url.is_some_and(|u| !u.trim().is_empty());
    let has_instructions = instructions.is_some_and(|i| !i.trim().is_empty());

    if content_type.requires_url() && !has_url {
        return Err(CoreError::Validation(format!(
            "{} content requires a url",
            content_type.label()
        )));
    }
    if !has_url && !has_instructions {
        return Err(CoreError::Validation(
            "content requires a url or instructions".into(),
        ));
    }
    Ok(())
}

/// Resolve the grouping label of a content item.
pub fn section_or_default(section: Option<&str>) -> &str {
    match section.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_SECTION,
    }
}

pub fn validate_sections(completed: i32, total: i32) -> Result<(), CoreError> {
    if total < 0 || completed < 0 {
        return Err(CoreError::Validation(
            "section counts must not be negative".into(),
        ));
    }
    if completed > total {
        return Err(CoreError::Validation(format!(
            "completedSections ({completed}) cannot exceed totalSections ({total})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Enrollment progress
// ---------------------------------------------------------------------------

/// Rounded completion percentage, `0` when there are no sections.
pub fn progress_percentage(completed: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    ((f64::from(completed) * 100.0 / f64::from(total)).round() as i32).clamp(0, 100)
}

/// The mutable progress fields of an enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub status: EnrollmentStatus,
    pub completed_sections: i32,
    pub total_sections: i32,
    pub progress_percentage: i32,
    pub completed_at: Option<Timestamp>,
}

impl ProgressState {
    /// Initial state of a new enrollment.
    pub fn new(total_sections: i32) -> Self {
        Self {
            status: EnrollmentStatus::Active,
            completed_sections: 0,
            total_sections: total_sections.max(0),
            progress_percentage: 0,
            completed_at: None,
        }
    }
}

/// Record section progress.
///
/// Finishing every section completes the enrollment; a dropped enrollment
/// cannot record progress. `total` replaces the section count when given.
pub fn apply_progress(
    current: &ProgressState,
    completed: i32,
    total: Option<i32>,
    now: Timestamp,
) -> Result<ProgressState, CoreError> {
    if current.status == EnrollmentStatus::Dropped {
        return Err(CoreError::Conflict(
            "cannot record progress on a dropped enrollment".into(),
        ));
    }

    let total = total.unwrap_or(current.total_sections);
    validate_sections(completed, total)?;

    let mut next = ProgressState {
        status: current.status,
        completed_sections: completed,
        total_sections: total,
        progress_percentage: progress_percentage(completed, total),
        completed_at: current.completed_at,
    };

    if total > 0 && completed == total {
        next.status = EnrollmentStatus::Completed;
        next.completed_at = current.completed_at.or(Some(now));
    } else {
        if next.status == EnrollmentStatus::Completed {
            next.status = EnrollmentStatus::Active;
        }
        next.completed_at = None;
    }

    Ok(next)
}

/// Move an enrollment to `status`.
///
/// Completing fills every section; leaving `completed` clears the
/// completion time. The percentage always follows the section counts, so
/// completing an enrollment with no sections leaves it at 0.
pub fn apply_status(current: &ProgressState, status: EnrollmentStatus, now: Timestamp) -> ProgressState {
    let mut next = current.clone();
    next.status = status;

    if status == EnrollmentStatus::Completed {
        next.completed_sections = current.total_sections;
        next.progress_percentage =
            progress_percentage(current.total_sections, current.total_sections);
        next.completed_at = current.completed_at.or(Some(now));
    } else {
        next.completed_at = None;
    }
    next
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    // -- vocabularies --

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Lab".parse::<ContentType>().unwrap(), ContentType::Lab);
        assert_eq!(
            " EXPERT ".parse::<Difficulty>().unwrap(),
            Difficulty::Expert
        );
        assert_eq!(
            "paused".parse::<EnrollmentStatus>().unwrap(),
            EnrollmentStatus::Paused
        );
    }

    #[test]
    fn unknown_choice_lists_allowed_values() {
        let err = "podcast".parse::<ContentType>().unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("video, lab, game, document"));
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&EnrollmentStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&Difficulty::Intermediate).unwrap(),
            "\"intermediate\""
        );
    }

    // -- field rules --

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  Web Basics ").unwrap(), "Web Basics");
    }

    #[test]
    fn blank_or_long_title_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn color_accepts_short_and_long_hex() {
        assert!(validate_color(Some("#fff")).is_ok());
        assert!(validate_color(Some("#1A2b3C")).is_ok());
        assert!(validate_color(None).is_ok());
        assert!(validate_color(Some("red")).is_err());
        assert!(validate_color(Some("#12345")).is_err());
    }

    #[test]
    fn topics_are_deduplicated_in_order() {
        let topics = vec![
            " xss ".to_string(),
            "SQLi".to_string(),
            "".to_string(),
            "XSS".to_string(),
        ];
        assert_eq!(normalize_topics(&topics).unwrap(), vec!["xss", "SQLi"]);
    }

    #[test]
    fn video_without_url_rejected() {
        assert!(validate_content_source(ContentType::Video, None, Some("watch it")).is_err());
        assert!(validate_content_source(ContentType::Video, Some("https://v"), None).is_ok());
    }

    #[test]
    fn lab_accepts_instructions_only() {
        assert!(validate_content_source(ContentType::Lab, None, Some("ssh in")).is_ok());
        assert!(validate_content_source(ContentType::Document, Some(" "), Some("")).is_err());
    }

    #[test]
    fn missing_section_falls_back_to_general() {
        assert_eq!(section_or_default(None), DEFAULT_SECTION);
        assert_eq!(section_or_default(Some("  ")), DEFAULT_SECTION);
        assert_eq!(section_or_default(Some("Recon")), "Recon");
    }

    #[test]
    fn negative_order_and_duration_rejected() {
        assert!(validate_order(-1).is_err());
        assert!(validate_order(0).is_ok());
        assert!(validate_duration(Some(-5)).is_err());
        assert!(validate_duration(None).is_ok());
    }

    // -- progress --

    #[test]
    fn percentage_rounds_and_handles_zero_total() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(5, 5), 100);
    }

    #[test]
    fn finishing_all_sections_completes() {
        let state = ProgressState::new(4);
        let next = apply_progress(&state, 4, None, now()).unwrap();
        assert_eq!(next.status, EnrollmentStatus::Completed);
        assert_eq!(next.progress_percentage, 100);
        assert_eq!(next.completed_at, Some(now()));
    }

    #[test]
    fn partial_progress_reopens_completed() {
        let done = apply_progress(&ProgressState::new(4), 4, None, now()).unwrap();
        let next = apply_progress(&done, 2, None, now()).unwrap();
        assert_eq!(next.status, EnrollmentStatus::Active);
        assert_eq!(next.progress_percentage, 50);
        assert_eq!(next.completed_at, None);
    }

    #[test]
    fn paused_stays_paused_on_partial_progress() {
        let mut state = ProgressState::new(10);
        state.status = EnrollmentStatus::Paused;
        let next = apply_progress(&state, 3, None, now()).unwrap();
        assert_eq!(next.status, EnrollmentStatus::Paused);
        assert_eq!(next.progress_percentage, 30);
    }

    #[test]
    fn progress_on_dropped_is_conflict() {
        let mut state = ProgressState::new(4);
        state.status = EnrollmentStatus::Dropped;
        assert_matches!(
            apply_progress(&state, 1, None, now()),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn progress_beyond_total_rejected() {
        let state = ProgressState::new(4);
        assert_matches!(
            apply_progress(&state, 5, None, now()),
            Err(CoreError::Validation(_))
        );
        // A new total may be supplied alongside the count.
        let next = apply_progress(&state, 5, Some(8), now()).unwrap();
        assert_eq!(next.total_sections, 8);
        assert_eq!(next.progress_percentage, 63);
    }

    #[test]
    fn completing_by_status_fills_sections() {
        let state = ProgressState::new(6);
        let next = apply_status(&state, EnrollmentStatus::Completed, now());
        assert_eq!(next.completed_sections, 6);
        assert_eq!(next.progress_percentage, 100);
        assert_eq!(next.completed_at, Some(now()));

        let reopened = apply_status(&next, EnrollmentStatus::Paused, now());
        assert_eq!(reopened.completed_at, None);
        assert_eq!(reopened.completed_sections, 6);
    }

    #[test]
    fn completing_without_sections_keeps_zero_percent() {
        let next = apply_status(&ProgressState::new(0), EnrollmentStatus::Completed, now());
        assert_eq!(next.status, EnrollmentStatus::Completed);
        assert_eq!(next.completed_sections, 0);
        assert_eq!(next.progress_percentage, 0);
        assert_eq!(next.completed_at, Some(now()));
    }

    #[test]
    fn defaults_are_beginner_and_active() {
        assert_eq!(Difficulty::default(), Difficulty::Beginner);
        assert_eq!(EnrollmentStatus::default(), EnrollmentStatus::Active);
    }
}
