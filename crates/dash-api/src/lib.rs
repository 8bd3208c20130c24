//! # dash-api
//!
//! Thin, stateless, typed wrapper over the project resource REST API.
//! The session core never depends on this crate; the UI layer composes
//! both.

mod client;
mod error;
mod models;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use models::{
    CreateProjectRequest, CreateProjectResponse, HealthResponse, ProjectPatch, ReportResponse,
    ReportType, TaskStatusUpdate,
};
