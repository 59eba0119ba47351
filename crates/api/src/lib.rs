//! Hack The World curriculum API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! rate limiting) so integration tests and the binary entrypoint can both
//! access them.

pub mod app;
pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
