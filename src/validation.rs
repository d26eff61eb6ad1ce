use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Validation error response
#[derive(Debug, Serialize)]
pub struct ValidationError {
    pub error: String,
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

// ============================================================================
// Username validation
// ============================================================================

pub const USERNAME_MIN_LENGTH: usize = 1;
pub const USERNAME_MAX_LENGTH: usize = 30;

pub fn validate_username(username: &str) -> ValidationResult<&str> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::new("Username is required").field("username"));
    }
    if username.len() > USERNAME_MAX_LENGTH {
        return Err(ValidationError::new(format!(
            "Username must be at most {} characters",
            USERNAME_MAX_LENGTH
        ))
        .field("username"));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::new(
            "Username can only contain letters, numbers, underscores, and hyphens",
        )
        .field("username"));
    }

    Ok(username)
}

// ============================================================================
// Code submission validation (shared by duel submit and judge enqueue)
// ============================================================================

pub const CODE_MAX_LENGTH: usize = 100_000;

pub fn validate_code(code: &str) -> ValidationResult<&str> {
    if code.is_empty() {
        return Err(ValidationError::new("Code cannot be empty").field("solutionCode"));
    }
    if code.len() > CODE_MAX_LENGTH {
        return Err(ValidationError::new(format!(
            "Code exceeds maximum length of {} characters",
            CODE_MAX_LENGTH
        ))
        .field("solutionCode"));
    }
    if code.contains('\0') {
        return Err(ValidationError::new("Code contains invalid characters").field("solutionCode"));
    }

    Ok(code)
}

pub fn validate_language(language: &str) -> ValidationResult<String> {
    let language = language.trim().to_lowercase();

    if !crate::models::solution::is_supported_language(&language) {
        return Err(ValidationError::new(format!(
            "Unsupported language. Supported: {}",
            crate::models::solution::SUPPORTED_LANGUAGES.join(", ")
        ))
        .field("languageUsed"));
    }

    Ok(language)
}

/// Narrower than `validate_language`: gates the judge dispatch HTTP surface
/// (section 4.D), which has no `c` worker, as opposed to duel/contest submit
/// (section 4.C), which does.
pub fn validate_judge_language(language: &str) -> ValidationResult<String> {
    let language = language.trim().to_lowercase();

    if !crate::models::solution::is_judge_supported_language(&language) {
        return Err(ValidationError::new(format!(
            "Unsupported language. Supported: {}",
            crate::models::solution::JUDGE_SUPPORTED_LANGUAGES.join(", ")
        ))
        .field("language"));
    }

    Ok(language)
}

// ============================================================================
// Identifier validation
// ============================================================================

pub const ID_MAX_LENGTH: usize = 100;

fn validate_slug_id<'a>(value: &'a str, field_name: &str) -> ValidationResult<&'a str> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::new(format!("{} is required", field_name)).field(field_name));
    }
    if value.len() > ID_MAX_LENGTH {
        return Err(ValidationError::new(format!("{} is too long", field_name)).field(field_name));
    }
    if !value.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(ValidationError::new(format!(
            "{} can only contain letters, numbers, underscores, and hyphens",
            field_name
        ))
        .field(field_name));
    }

    Ok(value)
}

pub fn validate_problem_id(problem_id: &str) -> ValidationResult<&str> {
    validate_slug_id(problem_id, "problemId")
}

pub fn validate_contest_id(contest_id: &str) -> ValidationResult<&str> {
    validate_slug_id(contest_id, "contestId")
}

// ============================================================================
// Matchmaking validation
// ============================================================================

pub const VALID_DIFFICULTIES: &[&str] = &["easy", "medium", "hard", "any"];

pub fn validate_difficulty(difficulty: &str) -> ValidationResult<String> {
    let difficulty = difficulty.trim().to_lowercase();

    if !VALID_DIFFICULTIES.contains(&difficulty.as_str()) {
        return Err(ValidationError::new(format!(
            "Invalid difficulty. Valid options: {}",
            VALID_DIFFICULTIES.join(", ")
        ))
        .field("difficulty"));
    }

    Ok(difficulty)
}

// ============================================================================
// Chat message truncation (session gateway `sendMessage`, section 4.E)
// ============================================================================

pub const CHAT_MESSAGE_MAX_LENGTH: usize = 500;

/// Truncates to the allowed length rather than rejecting — the gateway spec
/// calls for silent truncation, not a validation error, on long chat text.
pub fn truncate_chat_message(message: &str) -> String {
    if message.chars().count() <= CHAT_MESSAGE_MAX_LENGTH {
        message.to_string()
    } else {
        message.chars().take(CHAT_MESSAGE_MAX_LENGTH).collect()
    }
}

// ============================================================================
// Generic validators
// ============================================================================

pub fn validate_uuid(value: &str, field_name: &str) -> ValidationResult<uuid::Uuid> {
    value.parse::<uuid::Uuid>().map_err(|_| {
        ValidationError::new(format!("Invalid {} format", field_name)).field(field_name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("player123").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("player@123").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn code_rules() {
        assert!(validate_code("print(1)").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code(&"a".repeat(CODE_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn language_rules() {
        assert!(validate_language("Python").is_ok());
        assert!(validate_language("ruby").is_err());
    }

    #[test]
    fn judge_language_rules_reject_c() {
        assert!(validate_language("c").is_ok());
        assert!(validate_judge_language("c").is_err());
        assert!(validate_judge_language("Java").is_ok());
    }

    #[test]
    fn chat_message_truncates_rather_than_rejects() {
        let long = "x".repeat(600);
        let truncated = truncate_chat_message(&long);
        assert_eq!(truncated.chars().count(), CHAT_MESSAGE_MAX_LENGTH);
        let short = "hi";
        assert_eq!(truncate_chat_message(short), "hi");
    }

    #[test]
    fn problem_id_rules() {
        assert!(validate_problem_id("two-sum").is_ok());
        assert!(validate_problem_id("").is_err());
        assert!(validate_problem_id("two sum").is_err());
    }
}
