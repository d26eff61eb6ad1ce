use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseStatus {
    Passed,
    Failed,
    #[serde(rename = "TLE")]
    Tle,
    RuntimeError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionTestCaseResult {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub status: TestCaseStatus,
}

/// Immutable once created — the record of one code submission, either a duel
/// submission or a contest submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contest_id: Option<String>,
    pub problem_id: String,
    pub solution_code: String,
    pub language_used: String,
    pub score: i64,
    pub max_score: i64,
    pub test_cases: Vec<SolutionTestCaseResult>,
    pub time_occupied_ms: Option<i64>,
    pub memory_occupied_kb: Option<i64>,
    pub time_given_on_solution_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Supported languages for duel submission and contest solutions (section
/// 4.C's explicit set: cpp, python, javascript, c, java).
pub const SUPPORTED_LANGUAGES: &[&str] = &["cpp", "python", "javascript", "c", "java"];

/// Languages the judge dispatch HTTP surface (`/code/run`, `/code/submit`)
/// accepts (section 4.D: python, cpp, java, javascript -- no `c`). Narrower
/// than `SUPPORTED_LANGUAGES`: a duel submission in `c` still reaches the
/// judge queue through the `Evaluator` bridge, not through this check.
pub const JUDGE_SUPPORTED_LANGUAGES: &[&str] = &["python", "cpp", "java", "javascript"];

pub fn is_supported_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language.to_lowercase().as_str())
}

pub fn is_judge_supported_language(language: &str) -> bool {
    JUDGE_SUPPORTED_LANGUAGES.contains(&language.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_support_is_case_insensitive() {
        assert!(is_supported_language("Python"));
        assert!(is_supported_language("CPP"));
        assert!(!is_supported_language("rust"));
        assert!(!is_supported_language("go"));
    }

    #[test]
    fn judge_language_support_excludes_c() {
        assert!(is_supported_language("c"));
        assert!(!is_judge_supported_language("c"));
        assert!(is_judge_supported_language("Java"));
    }
}
