//! Judge dispatch HTTP surface (section 4.D / 6): enqueue run/submit jobs
//! and poll for their result. Actual execution happens out of process; these
//! handlers only talk to the `JudgeQueue` and, on first-persisted submit
//! completion, write the resulting `Solution` through `Store`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::judge::{EnqueueRequest, JobMode};
use crate::models::solution::Solution;
use crate::response;
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct RunTestCase {
    input: String,
    output: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest {
    language: String,
    code: String,
    #[serde(default)]
    test_cases: Vec<RunTestCase>,
}

pub async fn run_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<RunRequest>,
) -> AppResult<impl IntoResponse> {
    let language = validation::validate_judge_language(&body.language)?;
    validation::validate_code(&body.code)?;

    let test_cases = body
        .test_cases
        .into_iter()
        .map(|tc| (tc.input, tc.output))
        .collect();

    let job_id = state
        .judge
        .enqueue(EnqueueRequest {
            mode: JobMode::Run,
            language,
            code: body.code,
            problem_id: None,
            test_cases,
        })
        .await?;

    tracing::info!(job_id = %job_id, "run job enqueued");
    Ok(response::ok(StatusCode::ACCEPTED, json!({ "jobId": job_id }), "job enqueued"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitJobRequest {
    language: String,
    code: String,
    problem_id: String,
}

pub async fn submit_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<SubmitJobRequest>,
) -> AppResult<impl IntoResponse> {
    let language = validation::validate_judge_language(&body.language)?;
    validation::validate_code(&body.code)?;
    let problem_id = validation::validate_problem_id(&body.problem_id)?.to_string();

    let problem = state
        .store
        .get_problem(&problem_id)
        .await?
        .ok_or_else(|| AppError::not_found("problem not found"))?;
    let test_cases = problem
        .test_cases
        .iter()
        .map(|tc| (tc.input.clone(), tc.expected_output.clone()))
        .collect();

    let job_id = state
        .judge
        .enqueue(EnqueueRequest {
            mode: JobMode::Submit,
            language,
            code: body.code,
            problem_id: Some(problem_id),
            test_cases,
        })
        .await?;

    tracing::info!(job_id = %job_id, "submit job enqueued");
    Ok(response::ok(StatusCode::ACCEPTED, json!({ "jobId": job_id }), "job enqueued"))
}

pub async fn result_handler(
    State(state): State<AppState>,
    AuthUser { user_id }: AuthUser,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let poll = state
        .judge
        .poll(job_id)
        .await?
        .ok_or_else(|| AppError::not_found("invalid job"))?;

    if poll.newly_persisted {
        persist_submit_result(&state, user_id, job_id).await?;
    }

    Ok(response::ok(StatusCode::OK, poll, "ok"))
}

async fn persist_submit_result(state: &AppState, user_id: Uuid, job_id: Uuid) -> AppResult<()> {
    let Some(job) = state.judge.get(job_id).await? else {
        return Ok(());
    };
    if job.mode != JobMode::Submit {
        return Ok(());
    }
    let Some(problem_id) = job.problem_id.clone() else {
        return Ok(());
    };

    let max_score = state
        .store
        .get_problem(&problem_id)
        .await?
        .map(|p| p.max_score())
        .unwrap_or(0);

    let solution = Solution {
        id: Uuid::new_v4(),
        user_id,
        contest_id: None,
        problem_id,
        solution_code: job.code,
        language_used: job.language,
        score: job.score.unwrap_or(0),
        max_score,
        test_cases: job.results,
        time_occupied_ms: None,
        memory_occupied_kb: None,
        time_given_on_solution_ms: None,
        created_at: state.clock.now(),
    };
    state.store.create_solution(solution).await?;
    tracing::info!(job_id = %job_id, user_id = %user_id, "judge submission persisted");
    Ok(())
}
