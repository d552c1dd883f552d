//! Task board and meeting domain
//!
//! Tasks come out of meetings, move through `todo -> in-progress -> review ->
//! done`, and need a manager's approval before they count as confirmed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task status '{0}': must be todo, in-progress, review or done")]
pub struct InvalidStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Manager,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
}

impl User {
    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }
}

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Columns in board order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How sure the transcript extraction was that this is a real task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub owner: User,
    pub due_date: NaiveDate,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    pub created_at: NaiveDate,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    /// Minutes
    pub duration: u32,
    pub participants: Vec<User>,
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamActivity {
    pub id: String,
    pub user: User,
    pub action: String,
    /// Human-readable, e.g. "2 hours ago"
    pub timestamp: String,
}

/// Headline counts on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub todo: usize,
    pub in_progress: usize,
    pub pending_approval: usize,
    pub low_confidence: usize,
}

impl DashboardStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                _ => {}
            }
            if !task.approved {
                stats.pending_approval += 1;
            }
            if task.confidence == Confidence::Low {
                stats.low_confidence += 1;
            }
        }
        stats
    }
}

/// Number of open tasks and meetings shown on the dashboard
pub const DASHBOARD_PREVIEW: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub todays_tasks: Vec<Task>,
    pub recent_meetings: Vec<Meeting>,
    pub activity: Vec<TeamActivity>,
}

impl Dashboard {
    pub fn build(tasks: &[Task], meetings: Vec<Meeting>, activity: Vec<TeamActivity>) -> Self {
        let todays_tasks = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Done)
            .take(DASHBOARD_PREVIEW)
            .cloned()
            .collect();

        Self {
            stats: DashboardStats::from_tasks(tasks),
            todays_tasks,
            recent_meetings: meetings.into_iter().take(DASHBOARD_PREVIEW).collect(),
            activity,
        }
    }
}

/// Tasks awaiting approval vs already approved, as one viewer sees them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQueue {
    pub pending: Vec<Task>,
    pub approved: Vec<Task>,
}

impl ReviewQueue {
    /// Managers review every task; members only confirm their own
    pub fn for_viewer(tasks: Vec<Task>, viewer: &User) -> Self {
        let (approved, pending) = tasks
            .into_iter()
            .filter(|t| viewer.is_manager() || t.owner.id == viewer.id)
            .partition(|t| t.approved);

        Self { pending, approved }
    }
}

/// Group tasks into board columns, in column order
pub fn columns(tasks: &[Task]) -> Vec<(TaskStatus, Vec<&Task>)> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| {
            let column = tasks.iter().filter(|t| t.status == status).collect();
            (status, column)
        })
        .collect()
}
