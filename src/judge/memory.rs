use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::models::solution::{is_supported_language, SolutionTestCaseResult};

use super::{EnqueueRequest, Job, JobMode, JobStatus, JudgeQueue, PollResponse, RUN_JOB_TTL_SECS, SUBMIT_JOB_TTL_SECS};

/// FIFO queue keyed by `code_jobs:<language>:<mode>` (section 6 cache key layout).
pub struct InMemoryJudgeQueue {
    clock: Arc<dyn Clock>,
    jobs: RwLock<HashMap<Uuid, Job>>,
    queues: RwLock<HashMap<(String, JobMode), VecDeque<Uuid>>>,
}

impl InMemoryJudgeQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            jobs: RwLock::new(HashMap::new()),
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Pops the next job for a language, preferring submit-mode over run-mode
    /// (section 4.D step 4, section 6 "Workers pop from submit before run").
    /// Exposed for worker-simulation test harnesses driving the FIFO directly.
    pub async fn pop_next(&self, language: &str) -> Option<Uuid> {
        let mut queues = self.queues.write().await;
        if let Some(q) = queues.get_mut(&(language.to_string(), JobMode::Submit)) {
            if let Some(id) = q.pop_front() {
                return Some(id);
            }
        }
        if let Some(q) = queues.get_mut(&(language.to_string(), JobMode::Run)) {
            return q.pop_front();
        }
        None
    }
}

#[async_trait]
impl JudgeQueue for InMemoryJudgeQueue {
    async fn enqueue(&self, req: EnqueueRequest) -> AppResult<Uuid> {
        let language = req.language.to_lowercase();
        if !is_supported_language(&language) {
            return Err(AppError::bad_input(format!("unsupported language: {}", language)));
        }
        if req.mode == JobMode::Submit && req.problem_id.is_none() {
            return Err(AppError::bad_input("problemId is required for submit jobs"));
        }

        let job_id = Uuid::new_v4();
        let now = self.clock.now();
        let job = Job {
            job_id,
            mode: req.mode,
            language: language.clone(),
            code: req.code,
            problem_id: req.problem_id,
            test_cases: req.test_cases,
            status: JobStatus::Queued,
            score: None,
            passed: None,
            total: None,
            results: Vec::new(),
            persisted: false,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(SUBMIT_JOB_TTL_SECS),
        };

        self.jobs.write().await.insert(job_id, job);
        self.queues
            .write()
            .await
            .entry((language, req.mode))
            .or_default()
            .push_back(job_id);

        tracing::info!(job_id = %job_id, "job enqueued");
        Ok(job_id)
    }

    async fn get(&self, job_id: Uuid) -> AppResult<Option<Job>> {
        Ok(self.jobs.read().await.get(&job_id).cloned())
    }

    async fn poll(&self, job_id: Uuid) -> AppResult<Option<PollResponse>> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&job_id) else {
            return Ok(None);
        };

        if job.status != JobStatus::Completed {
            return Ok(Some(PollResponse {
                status: job.status,
                mode: job.mode,
                score: None,
                passed: None,
                total: None,
                results: Vec::new(),
                newly_persisted: false,
            }));
        }

        let mut newly_persisted = false;
        if job.mode == JobMode::Submit && !job.persisted {
            job.persisted = true;
            newly_persisted = true;
        }

        let ttl = if job.mode == JobMode::Submit {
            SUBMIT_JOB_TTL_SECS
        } else {
            RUN_JOB_TTL_SECS
        };
        job.expires_at = self.clock.now() + chrono::Duration::seconds(ttl);

        Ok(Some(PollResponse {
            status: job.status,
            mode: job.mode,
            score: job.score,
            passed: job.passed,
            total: job.total,
            results: job.results.clone(),
            newly_persisted,
        }))
    }

    async fn simulate_worker_complete(
        &self,
        job_id: Uuid,
        score: i64,
        passed: i32,
        total: i32,
        results: Vec<SolutionTestCaseResult>,
    ) -> AppResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::not_found("job not found"))?;
        job.status = JobStatus::Completed;
        job.score = Some(score);
        job.passed = Some(passed);
        job.total = Some(total);
        job.results = results;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::models::solution::TestCaseStatus;

    fn queue() -> InMemoryJudgeQueue {
        InMemoryJudgeQueue::new(Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn poll_missing_job_returns_none() {
        let q = queue();
        assert!(q.poll(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn submit_jobs_persist_exactly_once_across_repeated_polls() {
        let q = queue();
        let job_id = q
            .enqueue(EnqueueRequest {
                mode: JobMode::Submit,
                language: "python".into(),
                code: "print(1)".into(),
                problem_id: Some("p1".into()),
                test_cases: vec![],
            })
            .await
            .unwrap();

        q.simulate_worker_complete(
            job_id,
            80,
            4,
            5,
            vec![SolutionTestCaseResult {
                input: "1".into(),
                expected_output: "1".into(),
                actual_output: "1".into(),
                status: TestCaseStatus::Passed,
            }],
        )
        .await
        .unwrap();

        let mut persisted_count = 0;
        for _ in 0..5 {
            let resp = q.poll(job_id).await.unwrap().unwrap();
            assert_eq!(resp.status, JobStatus::Completed);
            assert_eq!(resp.score, Some(80));
            if resp.newly_persisted {
                persisted_count += 1;
            }
        }
        assert_eq!(persisted_count, 1);
    }

    #[tokio::test]
    async fn enqueue_rejects_unsupported_language() {
        let q = queue();
        let err = q
            .enqueue(EnqueueRequest {
                mode: JobMode::Run,
                language: "cobol".into(),
                code: "x".into(),
                problem_id: None,
                test_cases: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submit_jobs_pop_before_run_jobs_for_the_same_language() {
        let q = queue();
        let run_id = q
            .enqueue(EnqueueRequest {
                mode: JobMode::Run,
                language: "python".into(),
                code: "x".into(),
                problem_id: None,
                test_cases: vec![],
            })
            .await
            .unwrap();
        let submit_id = q
            .enqueue(EnqueueRequest {
                mode: JobMode::Submit,
                language: "python".into(),
                code: "x".into(),
                problem_id: Some("p1".into()),
                test_cases: vec![],
            })
            .await
            .unwrap();

        assert_eq!(q.pop_next("python").await, Some(submit_id));
        assert_eq!(q.pop_next("python").await, Some(run_id));
    }
}
