//! `Evaluator` bridges a duel's synchronous `submitSolution` handler (section
//! 4.C) to the out-of-process judge workers: it enqueues a run job on the
//! shared `JudgeQueue` and polls until the worker completes it, returning
//! just `(score, passedTestcases)`. Actual sandboxed execution is the
//! worker's job, not this crate's (section 1 non-goals).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::judge::{EnqueueRequest, JobMode, JobStatus, JudgeQueue};

#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, language: &str, code: &str, problem_id: &str) -> AppResult<(i64, i32)>;
}

pub struct JudgeBackedEvaluator {
    queue: Arc<dyn JudgeQueue>,
    poll_interval: Duration,
    max_polls: u32,
}

impl JudgeBackedEvaluator {
    pub fn new(queue: Arc<dyn JudgeQueue>) -> Self {
        Self {
            queue,
            poll_interval: Duration::from_millis(200),
            max_polls: 150, // ~30s ceiling, matching a duel's expected turnaround
        }
    }
}

#[async_trait]
impl Evaluator for JudgeBackedEvaluator {
    async fn evaluate(&self, language: &str, code: &str, problem_id: &str) -> AppResult<(i64, i32)> {
        let job_id = self
            .queue
            .enqueue(EnqueueRequest {
                mode: JobMode::Run,
                language: language.to_string(),
                code: code.to_string(),
                problem_id: Some(problem_id.to_string()),
                test_cases: vec![],
            })
            .await?;

        for _ in 0..self.max_polls {
            if let Some(resp) = self.queue.poll(job_id).await? {
                match resp.status {
                    JobStatus::Completed => {
                        return Ok((resp.score.unwrap_or(0), resp.passed.unwrap_or(0)));
                    }
                    JobStatus::Failed => {
                        return Err(AppError::internal("judge worker reported failure"));
                    }
                    JobStatus::Queued | JobStatus::Running => {}
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(AppError::internal("evaluation timed out waiting for judge worker"))
    }
}

/// Test double: returns a fixed `(score, passed)` pair instantly.
pub struct FixedEvaluator {
    pub score: i64,
    pub passed: i32,
}

#[async_trait]
impl Evaluator for FixedEvaluator {
    async fn evaluate(&self, _language: &str, _code: &str, _problem_id: &str) -> AppResult<(i64, i32)> {
        Ok((self.score, self.passed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::judge::memory::InMemoryJudgeQueue;

    #[tokio::test]
    async fn judge_backed_evaluator_waits_for_worker_completion() {
        let queue: Arc<dyn JudgeQueue> = Arc::new(InMemoryJudgeQueue::new(Arc::new(SystemClock)));
        let evaluator = JudgeBackedEvaluator {
            queue: queue.clone(),
            poll_interval: Duration::from_millis(10),
            max_polls: 50,
        };

        let queue_for_worker = queue.clone();
        let worker = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            let jobs = queue_for_worker.clone();
            // In a real deployment a separate process would locate this job id;
            // here we just grab whatever is queued for python.
            if let Some(job_id) = find_any_python_job(jobs.as_ref()).await {
                jobs.simulate_worker_complete(job_id, 100, 5, 5, vec![]).await.unwrap();
            }
        });

        let (score, passed) = evaluator.evaluate("python", "print(1)", "p1").await.unwrap();
        worker.await.unwrap();
        assert_eq!(score, 100);
        assert_eq!(passed, 5);
    }

    async fn find_any_python_job(queue: &InMemoryJudgeQueue) -> Option<uuid::Uuid> {
        queue.pop_next("python").await
    }

    #[tokio::test]
    async fn fixed_evaluator_returns_instantly() {
        let evaluator = FixedEvaluator { score: 42, passed: 3 };
        let (score, passed) = evaluator.evaluate("python", "x", "p1").await.unwrap();
        assert_eq!(score, 42);
        assert_eq!(passed, 3);
    }
}
