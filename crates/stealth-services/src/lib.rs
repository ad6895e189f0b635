//! HTTP surface for the Stealth Code scoring service.
//!
//! The [`api`] module exposes the scoring pipeline, the health report and
//! the caller's profile over a small axum router. Everything here is
//! plumbing: request parsing, bearer extraction and mapping pipeline errors
//! onto status codes. The work happens in `stealth-core`.

pub mod api;
pub mod error;

pub use api::{ApiState, build_router, serve};
pub use error::ApiError;
