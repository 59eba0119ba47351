//! Request middleware.
//!
//! - [`rate_limit::limit_by_client`] -- fixed-window request budget per client IP.

pub mod rate_limit;
