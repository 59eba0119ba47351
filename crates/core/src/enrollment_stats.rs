//! Enrollment tracking analytics.
//!
//! Pure derivations over enrollments already loaded in memory: status
//! breakdown, completion rate, progress distribution, per-module
//! summaries, enrollment velocity and at-risk learners.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::curriculum::EnrollmentStatus;
use crate::formatting::round1;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Trailing window used for velocity when the caller does not pass one.
pub const DEFAULT_VELOCITY_WINDOW_DAYS: i64 = 30;

/// Largest velocity window accepted.
pub const MAX_VELOCITY_WINDOW_DAYS: i64 = 365;

/// An active enrollment untouched for this many days is at risk.
pub const AT_RISK_INACTIVE_DAYS: i64 = 14;

/// Inclusive progress ranges for the distribution chart.
pub const PROGRESS_BUCKETS: [(i32, i32); 4] = [(0, 25), (26, 50), (51, 75), (76, 100)];

const SECS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The enrollment fields analytics read.
#[derive(Debug, Clone)]
pub struct EnrollmentSnapshot {
    pub module_id: DbId,
    pub status: EnrollmentStatus,
    pub progress_percentage: i32,
    pub enrolled_at: Timestamp,
    pub last_accessed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: EnrollmentStatus,
    pub label: &'static str,
    pub color: &'static str,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBucket {
    pub label: String,
    pub min: i32,
    pub max: i32,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEnrollmentSummary {
    pub module_id: DbId,
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub paused: usize,
    pub dropped: usize,
    pub completion_rate: f64,
    pub average_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub enrolled: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Velocity {
    pub window_days: i64,
    pub enrollments_in_window: usize,
    pub completions_in_window: usize,
    pub enrollments_per_day: f64,
    pub completions_per_day: f64,
    pub average_days_to_complete: Option<f64>,
    pub daily: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentAnalytics {
    pub total: usize,
    pub completion_rate: f64,
    pub average_progress: f64,
    pub at_risk: usize,
    pub status_breakdown: Vec<StatusCount>,
    pub progress_distribution: Vec<ProgressBucket>,
    pub by_module: Vec<ModuleEnrollmentSummary>,
    pub velocity: Velocity,
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// `part / total` as a percentage with one decimal, `0.0` when empty.
pub fn percentage_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / total as f64)
}

/// Share of enrollments that are completed.
pub fn completion_rate(completed: usize, total: usize) -> f64 {
    percentage_of(completed, total)
}

pub fn average_progress(enrollments: &[EnrollmentSnapshot]) -> f64 {
    if enrollments.is_empty() {
        return 0.0;
    }
    let sum: i64 = enrollments
        .iter()
        .map(|e| i64::from(e.progress_percentage.clamp(0, 100)))
        .sum();
    round1(sum as f64 / enrollments.len() as f64)
}

/// One entry per status, in [`EnrollmentStatus::ALL`] order, zeros included.
pub fn status_breakdown(enrollments: &[EnrollmentSnapshot]) -> Vec<StatusCount> {
    let total = enrollments.len();
    EnrollmentStatus::ALL
        .into_iter()
        .map(|status| {
            let count = enrollments.iter().filter(|e| e.status == status).count();
            StatusCount {
                status,
                label: status.label(),
                color: status.badge_color(),
                count,
                percentage: percentage_of(count, total),
            }
        })
        .collect()
}

/// Quartile histogram of progress percentages.
pub fn progress_distribution(enrollments: &[EnrollmentSnapshot]) -> Vec<ProgressBucket> {
    let mut counts = [0usize; PROGRESS_BUCKETS.len()];
    for e in enrollments {
        let p = e.progress_percentage.clamp(0, 100);
        if let Some(idx) = PROGRESS_BUCKETS
            .iter()
            .position(|(min, max)| (*min..=*max).contains(&p))
        {
            counts[idx] += 1;
        }
    }

    PROGRESS_BUCKETS
        .iter()
        .zip(counts)
        .map(|(&(min, max), count)| ProgressBucket {
            label: format!("{min}-{max}%"),
            min,
            max,
            count,
            percentage: percentage_of(count, enrollments.len()),
        })
        .collect()
}

/// Summaries per module, most enrollments first (ties by module id).
pub fn summarize_by_module(enrollments: &[EnrollmentSnapshot]) -> Vec<ModuleEnrollmentSummary> {
    let mut grouped: BTreeMap<DbId, Vec<&EnrollmentSnapshot>> = BTreeMap::new();
    for e in enrollments {
        grouped.entry(e.module_id).or_default().push(e);
    }

    let mut summaries: Vec<ModuleEnrollmentSummary> = grouped
        .into_iter()
        .map(|(module_id, items)| summarize(module_id, items.into_iter()))
        .collect();

    summaries.sort_by(|a, b| b.total.cmp(&a.total).then(a.module_id.cmp(&b.module_id)));
    summaries
}

/// Summary for a single module; enrollments of other modules are ignored.
pub fn summarize_module(module_id: DbId, enrollments: &[EnrollmentSnapshot]) -> ModuleEnrollmentSummary {
    summarize(
        module_id,
        enrollments.iter().filter(|e| e.module_id == module_id),
    )
}

fn summarize<'a>(
    module_id: DbId,
    items: impl Iterator<Item = &'a EnrollmentSnapshot>,
) -> ModuleEnrollmentSummary {
    let mut summary = ModuleEnrollmentSummary {
        module_id,
        total: 0,
        active: 0,
        completed: 0,
        paused: 0,
        dropped: 0,
        completion_rate: 0.0,
        average_progress: 0.0,
    };
    let mut progress_sum: i64 = 0;

    for e in items {
        summary.total += 1;
        progress_sum += i64::from(e.progress_percentage.clamp(0, 100));
        match e.status {
            EnrollmentStatus::Active => summary.active += 1,
            EnrollmentStatus::Completed => summary.completed += 1,
            EnrollmentStatus::Paused => summary.paused += 1,
            EnrollmentStatus::Dropped => summary.dropped += 1,
        }
    }

    if summary.total > 0 {
        summary.completion_rate = completion_rate(summary.completed, summary.total);
        summary.average_progress = round1(progress_sum as f64 / summary.total as f64);
    }
    summary
}

/// Enrollment and completion rates over the trailing `window_days` days
/// (today included), with a per-day series oldest first.
pub fn velocity(enrollments: &[EnrollmentSnapshot], now: Timestamp, window_days: i64) -> Velocity {
    let window_days = window_days.clamp(1, MAX_VELOCITY_WINDOW_DAYS);
    let today = now.date_naive();
    let start = today - Duration::days(window_days - 1);

    let mut daily: Vec<DailyCount> = (0..window_days)
        .map(|offset| DailyCount {
            date: start + Duration::days(offset),
            enrolled: 0,
            completed: 0,
        })
        .collect();

    let slot = |date: NaiveDate| -> Option<usize> {
        if date < start || date > today {
            return None;
        }
        usize::try_from((date - start).num_days()).ok()
    };

    let mut completion_days_sum = 0.0;
    let mut completion_samples = 0usize;

    for e in enrollments {
        if let Some(idx) = slot(e.enrolled_at.date_naive()) {
            daily[idx].enrolled += 1;
        }
        if let Some(done) = e.completed_at {
            if let Some(idx) = slot(done.date_naive()) {
                daily[idx].completed += 1;
            }
            if e.status == EnrollmentStatus::Completed && done >= e.enrolled_at {
                completion_days_sum +=
                    done.signed_duration_since(e.enrolled_at).num_seconds() as f64 / SECS_PER_DAY;
                completion_samples += 1;
            }
        }
    }

    let enrollments_in_window: usize = daily.iter().map(|d| d.enrolled).sum();
    let completions_in_window: usize = daily.iter().map(|d| d.completed).sum();

    Velocity {
        window_days,
        enrollments_in_window,
        completions_in_window,
        enrollments_per_day: round2(enrollments_in_window as f64 / window_days as f64),
        completions_per_day: round2(completions_in_window as f64 / window_days as f64),
        average_days_to_complete: (completion_samples > 0)
            .then(|| round1(completion_days_sum / completion_samples as f64)),
        daily,
    }
}

/// Active enrollments not accessed for [`AT_RISK_INACTIVE_DAYS`] or more.
pub fn count_at_risk(enrollments: &[EnrollmentSnapshot], now: Timestamp) -> usize {
    let cutoff = now - Duration::days(AT_RISK_INACTIVE_DAYS);
    enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Active)
        .filter(|e| e.last_accessed_at.unwrap_or(e.enrolled_at) <= cutoff)
        .count()
}

/// Everything the enrollment tracking screen shows, in one pass per metric.
pub fn analyze(enrollments: &[EnrollmentSnapshot], now: Timestamp, window_days: i64) -> EnrollmentAnalytics {
    let status_breakdown = status_breakdown(enrollments);
    let completed = status_breakdown
        .iter()
        .find(|s| s.status == EnrollmentStatus::Completed)
        .map_or(0, |s| s.count);

    EnrollmentAnalytics {
        total: enrollments.len(),
        completion_rate: completion_rate(completed, enrollments.len()),
        average_progress: average_progress(enrollments),
        at_risk: count_at_risk(enrollments, now),
        status_breakdown,
        progress_distribution: progress_distribution(enrollments),
        by_module: summarize_by_module(enrollments),
        velocity: velocity(enrollments, now, window_days),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn module(n: u8) -> DbId {
        DbId::from_bytes([n; 12])
    }

    fn snap(module_n: u8, status: EnrollmentStatus, progress: i32, enrolled_days_ago: i64) -> EnrollmentSnapshot {
        let enrolled_at = now() - Duration::days(enrolled_days_ago);
        EnrollmentSnapshot {
            module_id: module(module_n),
            status,
            progress_percentage: progress,
            enrolled_at,
            last_accessed_at: Some(enrolled_at),
            completed_at: None,
        }
    }

    fn completed(module_n: u8, enrolled_days_ago: i64, took_days: i64) -> EnrollmentSnapshot {
        let mut s = snap(module_n, EnrollmentStatus::Completed, 100, enrolled_days_ago);
        s.completed_at = Some(s.enrolled_at + Duration::days(took_days));
        s.last_accessed_at = s.completed_at;
        s
    }

    fn fixture() -> Vec<EnrollmentSnapshot> {
        vec![
            snap(1, EnrollmentStatus::Active, 40, 2),
            snap(1, EnrollmentStatus::Active, 10, 20),
            completed(1, 10, 4),
            snap(2, EnrollmentStatus::Paused, 60, 5),
            snap(2, EnrollmentStatus::Dropped, 0, 40),
            completed(3, 3, 2),
        ]
    }

    #[test]
    fn empty_input_yields_zeros() {
        let a = analyze(&[], now(), 7);
        assert_eq!(a.total, 0);
        assert_eq!(a.completion_rate, 0.0);
        assert_eq!(a.average_progress, 0.0);
        assert!(a.by_module.is_empty());
        assert_eq!(a.status_breakdown.len(), 4);
        assert!(a.status_breakdown.iter().all(|s| s.count == 0));
        assert_eq!(a.velocity.daily.len(), 7);
        assert_eq!(a.velocity.average_days_to_complete, None);
    }

    #[test]
    fn completion_rate_has_one_decimal() {
        assert_eq!(completion_rate(1, 3), 33.3);
        assert_eq!(completion_rate(2, 3), 66.7);
        assert_eq!(completion_rate(0, 0), 0.0);
    }

    #[test]
    fn status_breakdown_counts_and_colors() {
        let breakdown = status_breakdown(&fixture());
        let active = &breakdown[0];
        assert_eq!(active.status, EnrollmentStatus::Active);
        assert_eq!(active.count, 2);
        assert_eq!(active.percentage, 33.3);
        assert_eq!(active.color, EnrollmentStatus::Active.badge_color());

        let counts: Vec<usize> = breakdown.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![2, 2, 1, 1]);
    }

    #[test]
    fn distribution_uses_inclusive_quartiles() {
        let dist = progress_distribution(&fixture());
        let counts: Vec<usize> = dist.iter().map(|b| b.count).collect();
        // 10, 0 | 40 | 60 | 100, 100
        assert_eq!(counts, vec![2, 1, 1, 2]);
        assert_eq!(dist[0].label, "0-25%");
        assert_eq!(dist[3].label, "76-100%");
    }

    #[test]
    fn distribution_boundaries() {
        let items = vec![
            snap(1, EnrollmentStatus::Active, 25, 1),
            snap(1, EnrollmentStatus::Active, 26, 1),
            snap(1, EnrollmentStatus::Active, 75, 1),
            snap(1, EnrollmentStatus::Active, 76, 1),
        ];
        let counts: Vec<usize> = progress_distribution(&items).iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1]);
    }

    #[test]
    fn modules_sorted_by_enrollment_count() {
        let by_module = summarize_by_module(&fixture());
        let order: Vec<DbId> = by_module.iter().map(|m| m.module_id).collect();
        assert_eq!(order, vec![module(1), module(2), module(3)]);

        let first = &by_module[0];
        assert_eq!(first.total, 3);
        assert_eq!(first.active, 2);
        assert_eq!(first.completed, 1);
        assert_eq!(first.completion_rate, 33.3);
        assert_eq!(first.average_progress, 50.0);
    }

    #[test]
    fn single_module_summary_ignores_others() {
        let s = summarize_module(module(2), &fixture());
        assert_eq!(s.total, 2);
        assert_eq!(s.paused, 1);
        assert_eq!(s.dropped, 1);
        assert_eq!(s.completion_rate, 0.0);

        let missing = summarize_module(module(9), &fixture());
        assert_eq!(missing.total, 0);
        assert_eq!(missing.average_progress, 0.0);
    }

    #[test]
    fn velocity_counts_trailing_window() {
        let v = velocity(&fixture(), now(), 7);
        // Enrolled 2, 5 and 3 days ago fall inside the last 7 days.
        assert_eq!(v.enrollments_in_window, 3);
        // Completions: module 1 finished 6 days ago, module 3 finished 1 day ago.
        assert_eq!(v.completions_in_window, 2);
        assert_eq!(v.enrollments_per_day, 0.43);
        assert_eq!(v.daily.len(), 7);
        assert_eq!(v.daily.last().unwrap().date, now().date_naive());
        assert_eq!(v.average_days_to_complete, Some(3.0));
    }

    #[test]
    fn velocity_window_is_clamped() {
        assert_eq!(velocity(&[], now(), 0).window_days, 1);
        assert_eq!(
            velocity(&[], now(), 10_000).window_days,
            MAX_VELOCITY_WINDOW_DAYS
        );
    }

    #[test]
    fn at_risk_only_counts_stale_active() {
        // Active 20 days ago qualifies; the dropped one at 40 days does not.
        assert_eq!(count_at_risk(&fixture(), now()), 1);
    }

    #[test]
    fn analyze_combines_metrics() {
        let a = analyze(&fixture(), now(), DEFAULT_VELOCITY_WINDOW_DAYS);
        assert_eq!(a.total, 6);
        assert_eq!(a.completion_rate, 33.3);
        // (40 + 10 + 100 + 60 + 0 + 100) / 6
        assert_eq!(a.average_progress, 51.7);
        assert_eq!(a.by_module.len(), 3);
    }

    #[test]
    fn analytics_serialize_camel_case() {
        let json = serde_json::to_value(analyze(&fixture(), now(), 7)).unwrap();
        assert!(json.get("completionRate").is_some());
        assert!(json["velocity"].get("enrollmentsPerDay").is_some());
        assert_eq!(json["statusBreakdown"][1]["status"], "completed");
    }
}
