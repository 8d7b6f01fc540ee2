//! Caseflow API - REST Layer
//!
//! Axum HTTP surface over the workflow engine: opening cases, issuing
//! commands, and reading views, audit trails, links and inboxes. Errors leave
//! as structured JSON with the workflow's reason attached.

pub mod config;
pub mod error;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;
