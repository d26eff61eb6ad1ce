use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rating floor/ceiling shared by the duel and contest rating paths.
pub const MIN_RATING: i32 = 100;
pub const MAX_RATING: i32 = 4000;
pub const DEFAULT_RATING: i32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub rating: i32,
    /// Completed duels, fed into the K-factor tiering in rating math (section 4.A).
    pub duels_played: u32,
    pub solved_problems: Vec<SolvedProblem>,
    pub contests_participated: Vec<ContestParticipation>,
}

impl User {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            rating: DEFAULT_RATING,
            duels_played: 0,
            solved_problems: Vec::new(),
            contests_participated: Vec::new(),
        }
    }

    pub fn has_solved(&self, problem_id: &str) -> bool {
        self.solved_problems.iter().any(|p| p.problem_id == problem_id)
    }

    pub fn contest_entry_mut(&mut self, contest_id: &str) -> &mut ContestParticipation {
        if let Some(idx) = self
            .contests_participated
            .iter()
            .position(|c| c.contest_id == contest_id)
        {
            &mut self.contests_participated[idx]
        } else {
            self.contests_participated.push(ContestParticipation {
                contest_id: contest_id.to_string(),
                score: 0,
                contest_problems: Vec::new(),
            });
            self.contests_participated.last_mut().unwrap()
        }
    }

    pub fn contest_entry(&self, contest_id: &str) -> Option<&ContestParticipation> {
        self.contests_participated
            .iter()
            .find(|c| c.contest_id == contest_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedProblem {
    pub problem_id: String,
    pub solved_at: DateTime<Utc>,
}

/// A user's participation record in a single contest: accumulated score
/// plus the per-problem best scores it is derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestParticipation {
    pub contest_id: String,
    pub score: i64,
    pub contest_problems: Vec<ContestProblemScore>,
}

impl ContestParticipation {
    /// Upsert a problem's score, keeping the max of previous and new, and
    /// recomputing the aggregate contest score as the sum across problems (S5).
    pub fn upsert_problem_score(&mut self, problem_id: &str, score: i64) {
        if let Some(entry) = self
            .contest_problems
            .iter_mut()
            .find(|p| p.problem_id == problem_id)
        {
            entry.score = entry.score.max(score);
        } else {
            self.contest_problems.push(ContestProblemScore {
                problem_id: problem_id.to_string(),
                score,
            });
        }
        self.score = self.contest_problems.iter().map(|p| p.score).sum();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestProblemScore {
    pub problem_id: String,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub user_id: Uuid,
    pub username: String,
    pub score: i64,
    pub problems_solved: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_keeps_max_and_recomputes_sum() {
        let mut entry = ContestParticipation {
            contest_id: "c1".into(),
            score: 0,
            contest_problems: Vec::new(),
        };
        entry.upsert_problem_score("p1", 30);
        assert_eq!(entry.score, 30);
        entry.upsert_problem_score("p1", 70);
        assert_eq!(entry.score, 70);
        entry.upsert_problem_score("p2", 20);
        assert_eq!(entry.score, 90);
        // lower resubmission doesn't regress the kept max
        entry.upsert_problem_score("p1", 10);
        assert_eq!(entry.score, 90);
    }

    #[test]
    fn rating_bounds_match_spec() {
        assert_eq!(MIN_RATING, 100);
        assert_eq!(MAX_RATING, 4000);
    }
}
