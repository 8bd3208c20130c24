//! REST API client
//!
//! One `ApiClient` per backend origin; all methods are stateless and the
//! underlying `reqwest` client pools connections internally.

use std::time::Duration;

use serde::de::DeserializeOwned;

use dash_common::AppConfig;
use dash_core::Project;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::models::{
    CreateProjectRequest, CreateProjectResponse, DeleteResponse, HealthResponse, ProjectList,
    ProjectPatch, ReportResponse, ReportType, TaskStatusUpdate,
};

/// Default per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Typed client for the project resource API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given HTTP origin
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(http, base_url))
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        Self::new(config.api.base_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and decode the JSON body, mapping non-success
    /// statuses onto the backend's `{"detail": ...}` error shape
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

            tracing::debug!(status = status.as_u16(), detail = %detail, "api request failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json().await?)
    }

    /// `GET /` - backend health probe
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        self.execute(self.http.get(self.url("/"))).await
    }

    /// `GET /api/projects` - all projects
    pub async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        let list: ProjectList = self.execute(self.http.get(self.url("/api/projects"))).await?;
        Ok(list.projects)
    }

    /// `GET /api/projects/{id}` - one project
    pub async fn get_project(&self, project_id: &str) -> ApiResult<Project> {
        self.execute(
            self.http
                .get(self.url(&format!("/api/projects/{project_id}"))),
        )
        .await
    }

    /// `POST /api/projects` - create a project (the backend plans it)
    pub async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> ApiResult<CreateProjectResponse> {
        self.execute(self.http.post(self.url("/api/projects")).json(request))
            .await
    }

    /// `PUT /api/projects/{id}` - partial update
    pub async fn update_project(
        &self,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> ApiResult<Project> {
        self.execute(
            self.http
                .put(self.url(&format!("/api/projects/{project_id}")))
                .json(patch),
        )
        .await
    }

    /// `DELETE /api/projects/{id}`
    pub async fn delete_project(&self, project_id: &str) -> ApiResult<()> {
        let _: DeleteResponse = self
            .execute(
                self.http
                    .delete(self.url(&format!("/api/projects/{project_id}"))),
            )
            .await?;
        Ok(())
    }

    /// `PUT /api/projects/{id}/tasks` - apply a task status change
    ///
    /// The response body is passed through untyped; callers re-fetch the
    /// project for the authoritative state.
    pub async fn update_task_status(
        &self,
        project_id: &str,
        update: &TaskStatusUpdate,
    ) -> ApiResult<serde_json::Value> {
        self.execute(
            self.http
                .put(self.url(&format!("/api/projects/{project_id}/tasks")))
                .json(update),
        )
        .await
    }

    /// `GET /api/projects/{id}/report?type=` - generate a status report
    pub async fn generate_report(
        &self,
        project_id: &str,
        report_type: ReportType,
    ) -> ApiResult<ReportResponse> {
        self.execute(
            self.http
                .get(self.url(&format!("/api/projects/{project_id}/report")))
                .query(&[("type", report_type.as_str())]),
        )
        .await
    }
}
