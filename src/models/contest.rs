use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: String,
    pub title: String,
    pub problem_ids: Vec<String>,
    pub participant_ids: Vec<Uuid>,
    pub submission_ids: Vec<Uuid>,
}

impl Contest {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participant_ids.contains(&user_id)
    }
}
