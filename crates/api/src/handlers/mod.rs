//! HTTP handlers, one module per resource.
//!
//! Handlers validate input, call repositories and wrap results in
//! [`ApiResponse`](crate::response::ApiResponse).

pub mod content;
pub mod dashboard;
pub mod enrollments;
pub mod modules;
pub mod phases;
pub mod users;
