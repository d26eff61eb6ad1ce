//! `Store` is the persistence seam (section 3 "Ambient persistence note" /
//! section 4.F). One production adapter (`postgres`) and one in-memory
//! double (`memory`) implement it; the room engine, judge poll path, and
//! HTTP handlers only ever see the trait.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::contest::Contest;
use crate::models::problem::Problem;
use crate::models::solution::Solution;
use crate::models::user::{LeaderboardEntry, User};

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> AppResult<User>;
    async fn update_user(&self, user: &User) -> AppResult<()>;
    async fn update_user_rating(&self, user_id: Uuid, new_rating: i32) -> AppResult<()>;

    async fn random_problem(&self) -> AppResult<Option<Problem>>;
    async fn get_problem(&self, problem_id: &str) -> AppResult<Option<Problem>>;
    async fn list_problems(&self) -> AppResult<Vec<Problem>>;

    async fn create_solution(&self, solution: Solution) -> AppResult<Solution>;
    async fn latest_solution_for(
        &self,
        user_id: Uuid,
        problem_id: &str,
        contest_id: Option<&str>,
    ) -> AppResult<Option<Solution>>;

    async fn get_contest(&self, contest_id: &str) -> AppResult<Option<Contest>>;
    async fn get_contest_participant(&self, contest_id: &str, user_id: Uuid) -> AppResult<bool>;
    async fn upsert_contest_problem_score(
        &self,
        user_id: Uuid,
        contest_id: &str,
        problem_id: &str,
        score: i64,
    ) -> AppResult<()>;
    async fn append_contest_submission(&self, contest_id: &str, solution_id: Uuid) -> AppResult<()>;
    async fn leaderboard_rows(&self, contest_id: &str) -> AppResult<Vec<LeaderboardEntry>>;
}
