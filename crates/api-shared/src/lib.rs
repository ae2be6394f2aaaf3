//! # API Shared
//!
//! Shared definitions for the healthcare assistant APIs.
//!
//! Contains:
//! - Request/response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` for common functionality.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
