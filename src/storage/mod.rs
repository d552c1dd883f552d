//! Board storage
//!
//! - Memory: fixture-seeded, process-lifetime state behind a lock
//! - Fixtures: the bundled seed document

mod fixtures;
mod memory;

pub use fixtures::Seed;
pub use memory::MemoryStore;

use crate::board::{Meeting, Task, TaskStatus, TeamActivity, User};
pub use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid update: {0}")]
    Invalid(String),

    #[error("seed error: {0}")]
    Seed(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Which tasks to list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Owner user id
    #[serde(default)]
    pub owner: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.owner.as_deref().map_or(true, |id| task.owner.id == id)
    }
}

/// Partial task edit; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Reassign to this user id
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Trait for board storage
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Tasks matching the filter, in board order
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StorageError>;

    async fn get_task(&self, task_id: &str) -> Result<Task, StorageError>;

    /// Apply a partial edit and return the updated task
    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task, StorageError>;

    /// Mark a task approved
    async fn approve_task(&self, task_id: &str) -> Result<Task, StorageError>;

    /// Remove a task (rejected during review)
    async fn remove_task(&self, task_id: &str) -> Result<(), StorageError>;

    /// Meetings with their current tasks
    async fn meetings(&self) -> Result<Vec<Meeting>, StorageError>;

    async fn get_meeting(&self, meeting_id: &str) -> Result<Meeting, StorageError>;

    async fn team(&self) -> Result<Vec<User>, StorageError>;

    async fn get_user(&self, user_id: &str) -> Result<User, StorageError>;

    /// The signed-in dashboard user
    async fn current_user(&self) -> Result<User, StorageError>;

    async fn activity(&self) -> Result<Vec<TeamActivity>, StorageError>;
}
