//! `AskUserQuestion` tool types.
//!
//! Types for the interactive question tool that lets the agent ask
//! the user multiple-choice or free-form questions.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single option in a question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Display label.
    pub label: String,
    /// Optional value (defaults to label if absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Selection mode for a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Single choice.
    Single,
    /// Multiple choice.
    Multi,
}

/// A single question with options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskUserQuestion {
    /// Unique identifier.
    pub id: String,
    /// The question text.
    pub question: String,
    /// Available options.
    pub options: Vec<QuestionOption>,
    /// Selection mode.
    pub mode: SelectionMode,
    /// Whether to allow a free-form "Other" option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_other: Option<bool>,
    /// Placeholder text for the "Other" input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_placeholder: Option<String>,
}

/// Parameters for the `AskUserQuestion` tool call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AskUserQuestionParams {
    /// Array of questions (1–5).
    pub questions: Vec<AskUserQuestion>,
    /// Optional context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// A user's answer to a single question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    /// ID of the question being answered.
    pub question_id: String,
    /// Selected option values.
    pub selected_values: Vec<String>,
    /// Free-form response if `allow_other` was true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_value: Option<String>,
}

/// The complete result from the `AskUserQuestion` tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskUserQuestionResult {
    /// All answers.
    pub answers: Vec<QuestionAnswer>,
    /// Whether all questions were answered.
    pub complete: bool,
    /// ISO 8601 timestamp.
    pub submitted_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Validation result.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    /// Whether the params are valid.
    pub valid: bool,
    /// Error message if invalid.
    pub error: Option<String>,
}

/// Validate [`AskUserQuestionParams`].
#[must_use]
pub fn validate_params(params: &AskUserQuestionParams) -> ValidationResult {
    if params.questions.is_empty() {
        return ValidationResult {
            valid: false,
            error: Some("Must have at least 1 question".into()),
        };
    }
    if params.questions.len() > 5 {
        return ValidationResult {
            valid: false,
            error: Some("Must have at most 5 questions".into()),
        };
    }

    // Check for unique IDs
    let mut seen = std::collections::HashSet::new();
    for q in &params.questions {
        if !seen.insert(&q.id) {
            return ValidationResult {
                valid: false,
                error: Some("Question IDs must be unique".into()),
            };
        }
    }

    // Each question needs at least 2 options
    for q in &params.questions {
        if q.options.len() < 2 {
            return ValidationResult {
                valid: false,
                error: Some(format!(
                    "Question \"{}\" must have at least 2 options",
                    q.id
                )),
            };
        }
    }

    ValidationResult {
        valid: true,
        error: None,
    }
}

/// Check if all questions have been answered.
#[must_use]
pub fn is_complete(questions: &[AskUserQuestion], answers: &[QuestionAnswer]) -> bool {
    for question in questions {
        let answer = answers.iter().find(|a| a.question_id == question.id);
        match answer {
            None => return false,
            Some(a) => {
                let has_selected = !a.selected_values.is_empty();
                let has_other = a.other_value.as_ref().is_some_and(|v| !v.is_empty());
                if !has_selected && !has_other {
                    return false;
                }
            }
        }
    }
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
