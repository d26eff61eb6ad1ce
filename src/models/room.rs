use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Forfeited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Live,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUser {
    pub user_id: Uuid,
    pub username: String,
    /// Rating snapshot at room creation — settlement always computes off
    /// this, never off whatever the user's live rating drifts to meanwhile.
    pub rating: i32,
    pub score: i64,
    pub submission_status: SubmissionStatus,
    pub submission_time: Option<DateTime<Utc>>,
}

impl RoomUser {
    pub fn new(user_id: Uuid, username: impl Into<String>, rating: i32) -> Self {
        Self {
            user_id,
            username: username.into(),
            rating,
            score: 0,
            submission_status: SubmissionStatus::Pending,
            submission_time: None,
        }
    }
}

/// A live or just-settled duel between exactly two players.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: Uuid,
    pub problem_id: String,
    pub users: [RoomUser; 2],
    pub room_status: RoomStatus,
    /// False once settlement has run; distinct from `room_status` so a
    /// forfeited-but-not-yet-settled room can still be observed mid-transition.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(room_id: Uuid, problem_id: impl Into<String>, a: RoomUser, b: RoomUser, created_at: DateTime<Utc>) -> Self {
        Self {
            room_id,
            problem_id: problem_id.into(),
            users: [a, b],
            room_status: RoomStatus::Live,
            is_active: true,
            created_at,
        }
    }

    pub fn user_mut(&mut self, user_id: Uuid) -> Option<&mut RoomUser> {
        self.users.iter_mut().find(|u| u.user_id == user_id)
    }

    pub fn user(&self, user_id: Uuid) -> Option<&RoomUser> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn opponent(&self, user_id: Uuid) -> Option<&RoomUser> {
        self.users.iter().find(|u| u.user_id != user_id)
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.users.iter().any(|u| u.user_id == user_id)
    }

    /// True once every participant has either submitted or forfeited.
    pub fn all_resolved(&self) -> bool {
        self.users
            .iter()
            .all(|u| u.submission_status != SubmissionStatus::Pending)
    }
}
