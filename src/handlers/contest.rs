//! Contest-submission and problem-browsing HTTP surface (section 4.F). The
//! contest CRUD controllers (create/schedule/list contests) are out of scope
//! -- this module only covers the participant-facing submit/read endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::middleware::{AuthUser, OptionalAuthUser};
use crate::error::{AppError, AppResult};
use crate::models::solution::Solution;
use crate::models::user::SolvedProblem;
use crate::rating;
use crate::response;
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitSolutionRequest {
    score: i64,
    solution_code: String,
    language_used: String,
}

/// Legacy per-problem submission path (Open Question #1, resolved in
/// DESIGN.md): bumps rating by a flat +10 the first time a problem is solved
/// for full score. The batch contest-conclusion rating recompute in
/// `rating::contest_rating_change` is a separate, currently-unwired path.
pub async fn submit_solution_handler(
    State(state): State<AppState>,
    AuthUser { user_id }: AuthUser,
    Path((contest_id, problem_id)): Path<(String, String)>,
    Json(body): Json<SubmitSolutionRequest>,
) -> AppResult<impl IntoResponse> {
    let contest_id = validation::validate_contest_id(&contest_id)?.to_string();
    let problem_id = validation::validate_problem_id(&problem_id)?.to_string();
    let language_used = validation::validate_language(&body.language_used)?;
    validation::validate_code(&body.solution_code)?;

    if !state.store.get_contest_participant(&contest_id, user_id).await? {
        return Err(AppError::forbidden("not a participant in this contest"));
    }

    let problem = state
        .store
        .get_problem(&problem_id)
        .await?
        .ok_or_else(|| AppError::not_found("problem not found"))?;
    let actual_max_score = problem.max_score();

    let solution = Solution {
        id: Uuid::new_v4(),
        user_id,
        contest_id: Some(contest_id.clone()),
        problem_id: problem_id.clone(),
        solution_code: body.solution_code,
        language_used,
        score: body.score,
        max_score: actual_max_score,
        test_cases: Vec::new(),
        time_occupied_ms: None,
        memory_occupied_kb: None,
        time_given_on_solution_ms: None,
        created_at: state.clock.now(),
    };
    let solution = state.store.create_solution(solution).await?;
    state
        .store
        .append_contest_submission(&contest_id, solution.id)
        .await?;
    state
        .store
        .upsert_contest_problem_score(user_id, &contest_id, &problem_id, solution.score)
        .await?;

    let mut user = state.store.get_user(user_id).await?;
    if solution.score >= actual_max_score && !user.has_solved(&problem_id) {
        user.solved_problems.push(SolvedProblem {
            problem_id: problem_id.clone(),
            solved_at: state.clock.now(),
        });
        user.rating = rating::clamp_rating(user.rating + 10);
        state.store.update_user(&user).await?;
        tracing::info!(user_id = %user_id, problem_id = %problem_id, "first full-score solve, rating bumped");
    }

    Ok(response::ok(
        StatusCode::OK,
        json!({
            "solutionId": solution.id,
            "score": solution.score,
            "maxScore": solution.max_score,
        }),
        "solution recorded",
    ))
}

pub async fn get_contest_problem_handler(
    State(state): State<AppState>,
    AuthUser { user_id }: AuthUser,
    Path((contest_id, problem_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let contest_id = validation::validate_contest_id(&contest_id)?.to_string();
    let problem_id = validation::validate_problem_id(&problem_id)?.to_string();

    if !state.store.get_contest_participant(&contest_id, user_id).await? {
        return Err(AppError::forbidden("not a participant in this contest"));
    }

    let problem = state
        .store
        .get_problem(&problem_id)
        .await?
        .ok_or_else(|| AppError::not_found("problem not found"))?;
    let solution = state
        .store
        .latest_solution_for(user_id, &problem_id, Some(&contest_id))
        .await?;

    Ok(response::ok(
        StatusCode::OK,
        json!({ "problem": problem, "solution": solution }),
        "ok",
    ))
}

pub async fn get_problem_handler(
    State(state): State<AppState>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(problem_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let problem_id = validation::validate_problem_id(&problem_id)?.to_string();

    let problem = state
        .store
        .get_problem(&problem_id)
        .await?
        .ok_or_else(|| AppError::not_found("problem not found"))?;
    let solution = match auth {
        Some(AuthUser { user_id }) => state.store.latest_solution_for(user_id, &problem_id, None).await?,
        None => None,
    };

    Ok(response::ok(
        StatusCode::OK,
        json!({ "problem": problem, "solution": solution }),
        "ok",
    ))
}

pub async fn get_leaderboard_handler(
    State(state): State<AppState>,
    Path(contest_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let contest_id = validation::validate_contest_id(&contest_id)?.to_string();
    let rows = state.store.leaderboard_rows(&contest_id).await?;
    Ok(response::ok(StatusCode::OK, rows, "ok"))
}

pub async fn get_all_problems_handler(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let problems = state.store.list_problems().await?;
    Ok(response::ok(StatusCode::OK, problems, "ok"))
}
