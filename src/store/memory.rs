use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::contest::Contest;
use crate::models::problem::Problem;
use crate::models::solution::Solution;
use crate::models::user::{LeaderboardEntry, User};
use crate::random::Random;

use super::Store;

/// In-memory `Store` double used by unit tests and the worker-simulation
/// helper in the judge module; never wired into `main`.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    problems: RwLock<HashMap<String, Problem>>,
    solutions: RwLock<HashMap<Uuid, Solution>>,
    contests: RwLock<HashMap<String, Contest>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn seed_problem(&self, problem: Problem) {
        self.problems.write().await.insert(problem.id.clone(), problem);
    }

    pub async fn seed_contest(&self, contest: Contest) {
        self.contests.write().await.insert(contest.id.clone(), contest);
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user_rating(&self, user_id: Uuid, new_rating: i32) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found("user not found"))?;
        user.rating = new_rating;
        user.duels_played += 1;
        Ok(())
    }

    async fn random_problem(&self) -> AppResult<Option<Problem>> {
        let problems = self.problems.read().await;
        if problems.is_empty() {
            return Ok(None);
        }
        let values: Vec<&Problem> = problems.values().collect();
        let idx = crate::random::FastrandRandom.below(values.len());
        Ok(Some(values[idx].clone()))
    }

    async fn get_problem(&self, problem_id: &str) -> AppResult<Option<Problem>> {
        Ok(self.problems.read().await.get(problem_id).cloned())
    }

    async fn list_problems(&self) -> AppResult<Vec<Problem>> {
        Ok(self.problems.read().await.values().cloned().collect())
    }

    async fn create_solution(&self, mut solution: Solution) -> AppResult<Solution> {
        if solution.id.is_nil() {
            solution.id = Uuid::new_v4();
        }
        if solution.created_at == chrono::DateTime::<Utc>::UNIX_EPOCH {
            solution.created_at = Utc::now();
        }
        self.solutions.write().await.insert(solution.id, solution.clone());
        Ok(solution)
    }

    async fn latest_solution_for(
        &self,
        user_id: Uuid,
        problem_id: &str,
        contest_id: Option<&str>,
    ) -> AppResult<Option<Solution>> {
        let solutions = self.solutions.read().await;
        let latest = solutions
            .values()
            .filter(|s| {
                s.user_id == user_id
                    && s.problem_id == problem_id
                    && s.contest_id.as_deref() == contest_id
            })
            .max_by_key(|s| s.created_at)
            .cloned();
        Ok(latest)
    }

    async fn get_contest(&self, contest_id: &str) -> AppResult<Option<Contest>> {
        Ok(self.contests.read().await.get(contest_id).cloned())
    }

    async fn get_contest_participant(&self, contest_id: &str, user_id: Uuid) -> AppResult<bool> {
        let contests = self.contests.read().await;
        Ok(contests
            .get(contest_id)
            .map(|c| c.is_participant(user_id))
            .unwrap_or(false))
    }

    async fn upsert_contest_problem_score(
        &self,
        user_id: Uuid,
        contest_id: &str,
        problem_id: &str,
        score: i64,
    ) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found("user not found"))?;
        user.contest_entry_mut(contest_id).upsert_problem_score(problem_id, score);
        Ok(())
    }

    async fn append_contest_submission(&self, contest_id: &str, solution_id: Uuid) -> AppResult<()> {
        let mut contests = self.contests.write().await;
        let contest = contests
            .get_mut(contest_id)
            .ok_or_else(|| AppError::not_found("contest not found"))?;
        contest.submission_ids.push(solution_id);
        Ok(())
    }

    async fn leaderboard_rows(&self, contest_id: &str) -> AppResult<Vec<LeaderboardEntry>> {
        let contest = self
            .contests
            .read()
            .await
            .get(contest_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("contest not found"))?;

        let users = self.users.read().await;
        let mut rows: Vec<LeaderboardEntry> = contest
            .participant_ids
            .iter()
            .filter_map(|uid| users.get(uid))
            .map(|u| {
                let score = u.contest_entry(contest_id).map(|c| c.score).unwrap_or(0);
                let problems_solved = u
                    .solved_problems
                    .iter()
                    .filter(|sp| contest.problem_ids.contains(&sp.problem_id))
                    .count() as i32;
                LeaderboardEntry {
                    rank: 0,
                    user_id: u.id,
                    username: u.username.clone(),
                    score,
                    problems_solved,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.score.cmp(&a.score));
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = (i + 1) as i32;
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::problem::{Difficulty, Problem};
    use crate::models::user::User;

    #[tokio::test]
    async fn leaderboard_sorts_desc_and_ranks_densely() {
        let store = InMemoryStore::new();
        let contest = Contest {
            id: "c1".into(),
            title: "Round 1".into(),
            problem_ids: vec!["p1".into()],
            participant_ids: vec![],
            submission_ids: vec![],
        };
        let mut contest = contest;

        let mut alice = User::new(Uuid::new_v4(), "alice");
        alice.contest_entry_mut("c1").upsert_problem_score("p1", 100);
        let mut bob = User::new(Uuid::new_v4(), "bob");
        bob.contest_entry_mut("c1").upsert_problem_score("p1", 100);
        let mut carol = User::new(Uuid::new_v4(), "carol");
        carol.contest_entry_mut("c1").upsert_problem_score("p1", 50);

        contest.participant_ids = vec![alice.id, bob.id, carol.id];
        store.seed_contest(contest).await;
        store.seed_user(alice).await;
        store.seed_user(bob).await;
        store.seed_user(carol).await;

        let rows = store.leaderboard_rows("c1").await.unwrap();
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[2].rank, 3);
        assert_eq!(rows[2].score, 50);
    }

    #[tokio::test]
    async fn random_problem_is_none_when_empty() {
        let store = InMemoryStore::new();
        assert!(store.random_problem().await.unwrap().is_none());

        store
            .seed_problem(Problem {
                id: "p1".into(),
                title: "t".into(),
                description: "d".into(),
                difficulty: Difficulty::Easy,
                examples: vec![],
                constraints: vec![],
                test_cases: vec![],
                canonical_solution: None,
                stored_max_score: 100,
            })
            .await;
        assert!(store.random_problem().await.unwrap().is_some());
    }
}
