use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemExample {
    pub input: String,
    pub output: String,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemTestCase {
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub examples: Vec<ProblemExample>,
    pub constraints: Vec<String>,
    pub test_cases: Vec<ProblemTestCase>,
    /// Canonical reference solution, populated for `/get-problem/:problemId`.
    pub canonical_solution: Option<String>,
    /// Stored score ceiling; the *effective* ceiling is `max_score()`.
    pub stored_max_score: i64,
}

impl Problem {
    /// `maxScore` is derived: `max(stored, len(testCases) * 100)` (section 3).
    pub fn max_score(&self) -> i64 {
        self.stored_max_score.max(self.test_cases.len() as i64 * 100)
    }
}

/// The problem payload a duel's `matchFound` push carries (section 4.C: "Emit
/// `matchFound` to both with problem payload, `startedAt`, `endsAt`"). Omits
/// `canonicalSolution` and the hidden `testCases` -- handing either to a live
/// opponent would let them win the duel without solving it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelProblemView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub examples: Vec<ProblemExample>,
    pub constraints: Vec<String>,
}

impl From<&Problem> for DuelProblemView {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id.clone(),
            title: problem.title.clone(),
            description: problem.description.clone(),
            difficulty: problem.difficulty,
            examples: problem.examples.clone(),
            constraints: problem.constraints.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem_with(stored: i64, cases: usize) -> Problem {
        Problem {
            id: "p".into(),
            title: "t".into(),
            description: "d".into(),
            difficulty: Difficulty::Easy,
            examples: vec![],
            constraints: vec![],
            test_cases: (0..cases)
                .map(|i| ProblemTestCase {
                    input: i.to_string(),
                    expected_output: i.to_string(),
                })
                .collect(),
            canonical_solution: None,
            stored_max_score: stored,
        }
    }

    #[test]
    fn max_score_takes_the_larger_of_stored_or_derived() {
        assert_eq!(problem_with(0, 3).max_score(), 300);
        assert_eq!(problem_with(1000, 3).max_score(), 1000);
        assert_eq!(problem_with(50, 1).max_score(), 100);
    }

    #[test]
    fn duel_problem_view_hides_the_canonical_solution_and_test_cases() {
        let mut problem = problem_with(100, 2);
        problem.canonical_solution = Some("def solve(): ...".into());
        let view = DuelProblemView::from(&problem);
        let serialized = serde_json::to_value(&view).unwrap();
        assert!(serialized.get("canonicalSolution").is_none());
        assert!(serialized.get("testCases").is_none());
        assert_eq!(serialized["id"], "p");
    }
}
