//! In-memory board store

use crate::board::{Meeting, Task, TeamActivity, User};
use crate::storage::{async_trait, BoardStore, Seed, StorageError, TaskFilter, TaskUpdate};
use parking_lot::RwLock;
use tracing::debug;

struct BoardState {
    team: Vec<User>,
    tasks: Vec<Task>,
    meetings: Vec<Meeting>,
    activity: Vec<TeamActivity>,
}

/// Board state held for the life of the process
pub struct MemoryStore {
    current_user: User,
    state: RwLock<BoardState>,
}

impl MemoryStore {
    pub fn new(seed: Seed) -> Self {
        Self {
            current_user: seed.current_user,
            state: RwLock::new(BoardState {
                team: seed.team,
                tasks: seed.tasks,
                meetings: seed.meetings,
                activity: seed.activity,
            }),
        }
    }

    /// Store seeded from the bundled fixtures
    pub fn bundled() -> Result<Self, StorageError> {
        Ok(Self::new(Seed::bundled()?))
    }

    fn with_meeting_tasks(meeting: &Meeting, tasks: &[Task]) -> Meeting {
        let mut meeting = meeting.clone();
        meeting.tasks = tasks
            .iter()
            .filter(|t| t.meeting_id.as_deref() == Some(meeting.id.as_str()))
            .cloned()
            .collect();
        meeting
    }
}

fn task_not_found(task_id: &str) -> StorageError {
    StorageError::NotFound(format!("task {}", task_id))
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StorageError> {
        let state = self.state.read();
        Ok(state
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, StorageError> {
        self.state
            .read()
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or_else(|| task_not_found(task_id))
    }

    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task, StorageError> {
        let title = match update.title {
            Some(title) => {
                let trimmed = title.trim();
                if trimmed.is_empty() {
                    return Err(StorageError::Invalid("title cannot be empty".to_string()));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let mut state = self.state.write();

        let owner = match &update.owner_id {
            Some(owner_id) => Some(
                state
                    .team
                    .iter()
                    .find(|u| &u.id == owner_id)
                    .cloned()
                    .ok_or_else(|| StorageError::NotFound(format!("user {}", owner_id)))?,
            ),
            None => None,
        };

        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| task_not_found(task_id))?;

        if let Some(status) = update.status {
            debug!(task_id, from = %task.status, to = %status, "Moving task");
            task.status = status;
        }
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(owner) = owner {
            debug!(task_id, owner = %owner.id, "Reassigning task");
            task.owner = owner;
        }

        Ok(task.clone())
    }

    async fn approve_task(&self, task_id: &str) -> Result<Task, StorageError> {
        let mut state = self.state.write();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| task_not_found(task_id))?;

        task.approved = true;
        Ok(task.clone())
    }

    async fn remove_task(&self, task_id: &str) -> Result<(), StorageError> {
        let mut state = self.state.write();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != task_id);

        if state.tasks.len() == before {
            return Err(task_not_found(task_id));
        }
        Ok(())
    }

    async fn meetings(&self) -> Result<Vec<Meeting>, StorageError> {
        let state = self.state.read();
        Ok(state
            .meetings
            .iter()
            .map(|m| Self::with_meeting_tasks(m, &state.tasks))
            .collect())
    }

    async fn get_meeting(&self, meeting_id: &str) -> Result<Meeting, StorageError> {
        let state = self.state.read();
        state
            .meetings
            .iter()
            .find(|m| m.id == meeting_id)
            .map(|m| Self::with_meeting_tasks(m, &state.tasks))
            .ok_or_else(|| StorageError::NotFound(format!("meeting {}", meeting_id)))
    }

    async fn team(&self) -> Result<Vec<User>, StorageError> {
        Ok(self.state.read().team.clone())
    }

    async fn get_user(&self, user_id: &str) -> Result<User, StorageError> {
        self.state
            .read()
            .team
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("user {}", user_id)))
    }

    async fn current_user(&self) -> Result<User, StorageError> {
        Ok(self.current_user.clone())
    }

    async fn activity(&self) -> Result<Vec<TeamActivity>, StorageError> {
        Ok(self.state.read().activity.clone())
    }
}
