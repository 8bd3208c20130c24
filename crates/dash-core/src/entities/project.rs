//! Project entity - the aggregate the dashboard revolves around

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Task;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Completed,
    Archived,
}

impl ProjectStatus {
    /// Check if the project is still being worked on
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Traffic-light health indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthIndicator {
    #[default]
    Green,
    Yellow,
    Red,
}

/// A planning phase grouping related tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub phase_number: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_weeks: Option<u32>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Project entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub completion_percentage: u8,
    #[serde(default)]
    pub health_indicator: HealthIndicator,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Project {
    /// Iterate over every task across all phases
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.phases.iter().flat_map(|p| p.tasks.iter())
    }

    /// Total number of tasks in the plan
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }

    /// Find a task by its identifier
    #[must_use]
    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks().find(|t| t.task_id == task_id)
    }

    /// Fraction of tasks completed, computed from the plan (not the
    /// server-reported `completion_percentage`)
    #[must_use]
    pub fn computed_completion(&self) -> f64 {
        let total = self.task_count();
        if total == 0 {
            return 0.0;
        }

        let done = self.tasks().filter(|t| t.status.is_done()).count();
        done as f64 / total as f64
    }

    /// Check if the deadline has passed relative to the given date
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if matches!(self.status, ProjectStatus::Completed) {
            return false;
        }
        self.deadline.is_some_and(|deadline| deadline < today)
    }
}
