//! Seed data for the in-memory board
//!
//! The seed refers to people by id; loading resolves those ids into full
//! `User` values and rejects dangling references.

use crate::board::{Confidence, Meeting, Task, TaskStatus, TeamActivity, User};
use crate::storage::StorageError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_SEED: &str = include_str!("seed.json");

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedFile {
    current_user_id: String,
    team: Vec<User>,
    tasks: Vec<SeedTask>,
    meetings: Vec<SeedMeeting>,
    activity: Vec<SeedActivity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedTask {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    status: TaskStatus,
    owner_id: String,
    due_date: NaiveDate,
    confidence: Confidence,
    #[serde(default)]
    meeting_id: Option<String>,
    created_at: NaiveDate,
    approved: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedMeeting {
    id: String,
    title: String,
    date: NaiveDate,
    duration: u32,
    participant_ids: Vec<String>,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    is_live: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedActivity {
    id: String,
    user_id: String,
    action: String,
    timestamp: String,
}

/// Resolved board contents
#[derive(Debug, Clone)]
pub struct Seed {
    pub current_user: User,
    pub team: Vec<User>,
    pub tasks: Vec<Task>,
    /// Meetings without their tasks; stores join tasks by `meeting_id`
    pub meetings: Vec<Meeting>,
    pub activity: Vec<TeamActivity>,
}

impl Seed {
    /// The fixture data bundled with the crate
    pub fn bundled() -> Result<Self, StorageError> {
        Self::from_json(DEFAULT_SEED)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let file: SeedFile =
            serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;

        let people: HashMap<&str, &User> = file.team.iter().map(|u| (u.id.as_str(), u)).collect();
        let person = |id: &str, what: &str| -> Result<User, StorageError> {
            people
                .get(id)
                .map(|u| (*u).clone())
                .ok_or_else(|| StorageError::Seed(format!("{} refers to unknown user {}", what, id)))
        };

        let current_user = person(&file.current_user_id, "currentUserId")?;

        let tasks = file
            .tasks
            .into_iter()
            .map(|t| {
                Ok(Task {
                    owner: person(&t.owner_id, &format!("task {}", t.id))?,
                    id: t.id,
                    title: t.title,
                    description: t.description,
                    status: t.status,
                    due_date: t.due_date,
                    confidence: t.confidence,
                    meeting_id: t.meeting_id,
                    created_at: t.created_at,
                    approved: t.approved,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let meetings = file
            .meetings
            .into_iter()
            .map(|m| {
                let participants = m
                    .participant_ids
                    .iter()
                    .map(|id| person(id, &format!("meeting {}", m.id)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Meeting {
                    id: m.id,
                    title: m.title,
                    date: m.date,
                    duration: m.duration,
                    participants,
                    tasks: Vec::new(),
                    transcript: m.transcript,
                    is_live: m.is_live,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let activity = file
            .activity
            .into_iter()
            .map(|a| {
                Ok(TeamActivity {
                    user: person(&a.user_id, &format!("activity {}", a.id))?,
                    id: a.id,
                    action: a.action,
                    timestamp: a.timestamp,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(Self {
            current_user,
            team: file.team,
            tasks,
            meetings,
            activity,
        })
    }
}
