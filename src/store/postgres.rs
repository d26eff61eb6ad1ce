use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::contest::Contest;
use crate::models::problem::{Difficulty, Problem};
use crate::models::solution::Solution;
use crate::models::user::{ContestParticipation, LeaderboardEntry, SolvedProblem, User};

use super::Store;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_difficulty(s: &str) -> Difficulty {
    match s {
        "medium" => Difficulty::Medium,
        "hard" => Difficulty::Hard,
        _ => Difficulty::Easy,
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query(
            "SELECT id, username, rating, duels_played, solved_problems, contests_participated FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            rating: row.try_get("rating")?,
            duels_played: row.try_get::<i32, _>("duels_played")? as u32,
            solved_problems: serde_json::from_value::<Vec<SolvedProblem>>(
                row.try_get("solved_problems")?,
            )
            .unwrap_or_default(),
            contests_participated: serde_json::from_value::<Vec<ContestParticipation>>(
                row.try_get("contests_participated")?,
            )
            .unwrap_or_default(),
        })
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET rating = $2, solved_problems = $3, contests_participated = $4 WHERE id = $1",
        )
        .bind(user.id)
        .bind(user.rating)
        .bind(serde_json::to_value(&user.solved_problems).unwrap_or_default())
        .bind(serde_json::to_value(&user.contests_participated).unwrap_or_default())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_user_rating(&self, user_id: Uuid, new_rating: i32) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET rating = $2, duels_played = duels_played + 1 WHERE id = $1",
        )
        .bind(user_id)
        .bind(new_rating)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn random_problem(&self) -> AppResult<Option<Problem>> {
        let row = sqlx::query(
            "SELECT id, title, description, difficulty, examples, constraints, test_cases, canonical_solution, stored_max_score \
             FROM problems ORDER BY random() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_problem).transpose()?)
    }

    async fn get_problem(&self, problem_id: &str) -> AppResult<Option<Problem>> {
        let row = sqlx::query(
            "SELECT id, title, description, difficulty, examples, constraints, test_cases, canonical_solution, stored_max_score \
             FROM problems WHERE id = $1",
        )
        .bind(problem_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_problem).transpose()?)
    }

    async fn list_problems(&self) -> AppResult<Vec<Problem>> {
        let rows = sqlx::query(
            "SELECT id, title, description, difficulty, examples, constraints, test_cases, canonical_solution, stored_max_score \
             FROM problems",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_problem).collect()
    }

    async fn create_solution(&self, solution: Solution) -> AppResult<Solution> {
        sqlx::query(
            "INSERT INTO solutions (id, user_id, contest_id, problem_id, solution_code, language_used, \
             score, max_score, test_cases, time_occupied_ms, memory_occupied_kb, time_given_on_solution_ms, created_at) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)",
        )
        .bind(solution.id)
        .bind(solution.user_id)
        .bind(&solution.contest_id)
        .bind(&solution.problem_id)
        .bind(&solution.solution_code)
        .bind(&solution.language_used)
        .bind(solution.score)
        .bind(solution.max_score)
        .bind(serde_json::to_value(&solution.test_cases).unwrap_or_default())
        .bind(solution.time_occupied_ms)
        .bind(solution.memory_occupied_kb)
        .bind(solution.time_given_on_solution_ms)
        .bind(solution.created_at)
        .execute(&self.pool)
        .await?;

        Ok(solution)
    }

    async fn latest_solution_for(
        &self,
        user_id: Uuid,
        problem_id: &str,
        contest_id: Option<&str>,
    ) -> AppResult<Option<Solution>> {
        let row = sqlx::query(
            "SELECT id, user_id, contest_id, problem_id, solution_code, language_used, score, max_score, \
             test_cases, time_occupied_ms, memory_occupied_kb, time_given_on_solution_ms, created_at \
             FROM solutions WHERE user_id = $1 AND problem_id = $2 AND contest_id IS NOT DISTINCT FROM $3 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(contest_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_solution).transpose()?)
    }

    async fn get_contest(&self, contest_id: &str) -> AppResult<Option<Contest>> {
        let row = sqlx::query(
            "SELECT id, title, problem_ids, participant_ids, submission_ids FROM contests WHERE id = $1",
        )
        .bind(contest_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_contest).transpose()?)
    }

    async fn get_contest_participant(&self, contest_id: &str, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .get_contest(contest_id)
            .await?
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
        let mut user = self.get_user(user_id).await?;
        user.contest_entry_mut(contest_id).upsert_problem_score(problem_id, score);
        self.update_user(&user).await
    }

    async fn append_contest_submission(&self, contest_id: &str, solution_id: Uuid) -> AppResult<()> {
        let contest = self
            .get_contest(contest_id)
            .await?
            .ok_or_else(|| AppError::not_found("contest not found"))?;
        let mut submission_ids = contest.submission_ids;
        submission_ids.push(solution_id);

        sqlx::query("UPDATE contests SET submission_ids = $2 WHERE id = $1")
            .bind(contest_id)
            .bind(serde_json::to_value(&submission_ids).unwrap_or_default())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn leaderboard_rows(&self, contest_id: &str) -> AppResult<Vec<LeaderboardEntry>> {
        let contest = self
            .get_contest(contest_id)
            .await?
            .ok_or_else(|| AppError::not_found("contest not found"))?;

        let mut rows = Vec::new();
        for user_id in &contest.participant_ids {
            let user = self.get_user(*user_id).await?;
            let score = user.contest_entry(contest_id).map(|c| c.score).unwrap_or(0);
            let problems_solved = user
                .solved_problems
                .iter()
                .filter(|sp| contest.problem_ids.contains(&sp.problem_id))
                .count() as i32;
            rows.push(LeaderboardEntry {
                rank: 0,
                user_id: user.id,
                username: user.username,
                score,
                problems_solved,
            });
        }

        rows.sort_by(|a, b| b.score.cmp(&a.score));
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = (i + 1) as i32;
        }
        Ok(rows)
    }
}

fn row_to_problem(row: sqlx::postgres::PgRow) -> AppResult<Problem> {
    let difficulty: String = row.try_get("difficulty")?;
    Ok(Problem {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        difficulty: parse_difficulty(&difficulty),
        examples: serde_json::from_value(row.try_get("examples")?)
            .unwrap_or_default(),
        constraints: serde_json::from_value(row.try_get("constraints")?)
            .unwrap_or_default(),
        test_cases: serde_json::from_value(row.try_get("test_cases")?)
            .unwrap_or_default(),
        canonical_solution: row.try_get("canonical_solution")?,
        stored_max_score: row.try_get("stored_max_score")?,
    })
}

fn row_to_solution(row: sqlx::postgres::PgRow) -> AppResult<Solution> {
    Ok(Solution {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        contest_id: row.try_get("contest_id")?,
        problem_id: row.try_get("problem_id")?,
        solution_code: row.try_get("solution_code")?,
        language_used: row.try_get("language_used")?,
        score: row.try_get("score")?,
        max_score: row.try_get("max_score")?,
        test_cases: serde_json::from_value(row.try_get("test_cases")?)
            .unwrap_or_default(),
        time_occupied_ms: row.try_get("time_occupied_ms")?,
        memory_occupied_kb: row.try_get("memory_occupied_kb")?,
        time_given_on_solution_ms: row
            .try_get("time_given_on_solution_ms")
            ?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_contest(row: sqlx::postgres::PgRow) -> AppResult<Contest> {
    Ok(Contest {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        problem_ids: serde_json::from_value(row.try_get("problem_ids")?)
            .unwrap_or_default(),
        participant_ids: serde_json::from_value(
            row.try_get("participant_ids")?,
        )
        .unwrap_or_default(),
        submission_ids: serde_json::from_value(
            row.try_get("submission_ids")?,
        )
        .unwrap_or_default(),
    })
}
