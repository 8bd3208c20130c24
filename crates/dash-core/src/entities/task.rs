//! Task entity - a single unit of work inside a project phase

use serde::{Deserialize, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    /// Check if the task is in a terminal state
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if the task can currently be worked on
    #[inline]
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

/// Task entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub title: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Task {
    /// Create a new pending task
    pub fn new(task_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            title: title.into(),
            priority: TaskPriority::default(),
            estimated_hours: None,
            status: TaskStatus::default(),
            notes: None,
        }
    }

    /// Set the priority (builder-style)
    #[must_use]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the estimate in hours (builder-style)
    #[must_use]
    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Apply a status change, replacing any previous notes
    pub fn apply_status(&mut self, status: TaskStatus, notes: Option<String>) {
        self.status = status;
        self.notes = notes;
    }
}
