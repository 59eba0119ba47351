//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod content_repo;
pub mod enrollment_repo;
pub mod module_repo;
pub mod phase_repo;
pub mod stats_repo;
pub mod user_repo;

pub use content_repo::ContentRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use module_repo::ModuleRepo;
pub use phase_repo::PhaseRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;

/// Build an `ILIKE` pattern matching `term` anywhere, with `%`, `_` and
/// `\` in the term matched literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
