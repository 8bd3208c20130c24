//! Request and response DTOs for the resource API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use dash_core::{HealthIndicator, Project, ProjectStatus, TaskStatus};

/// Health probe response from `GET /`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: String,
}

/// Response wrapper for `GET /api/projects`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Body for `POST /api/projects`
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub team_members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl CreateProjectRequest {
    /// Create a minimal request
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            goals: Vec::new(),
            start_date: None,
            deadline: None,
            team_members: Vec::new(),
            budget: None,
        }
    }

    /// Add a goal (builder-style)
    #[must_use]
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goals.push(goal.into());
        self
    }

    /// Set the description (builder-style)
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the deadline (builder-style)
    #[must_use]
    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Response for `POST /api/projects`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectResponse {
    pub project_id: String,
    pub project: Project,
}

/// Partial update body for `PUT /api/projects/{id}`
///
/// Only the populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_indicator: Option<HealthIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

/// Body for `PUT /api/projects/{id}/tasks`
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusUpdate {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Status report flavor for `GET /api/projects/{id}/report?type=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Weekly,
    Monthly,
    Executive,
    Detailed,
}

impl ReportType {
    /// Query-parameter value for this report type
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Executive => "executive",
            Self::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response for `GET /api/projects/{id}/report`
#[derive(Debug, Clone, Deserialize)]
pub struct ReportResponse {
    pub project_id: String,
    pub generated_at: DateTime<Utc>,
    pub report: String,
    #[serde(default)]
    pub completion_percentage: u8,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub health_indicator: HealthIndicator,
}

/// Response for `DELETE /api/projects/{id}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeleteResponse {
    #[serde(default)]
    #[allow(dead_code)]
    pub message: Option<String>,
}
