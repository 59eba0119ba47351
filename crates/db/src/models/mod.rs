//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! JSON field names are camelCase; the admin console reads them as-is.

pub mod content;
pub mod dashboard;
pub mod enrollment;
pub mod module;
pub mod phase;
pub mod user;
