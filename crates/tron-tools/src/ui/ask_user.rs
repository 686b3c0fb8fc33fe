//! `AskUserQuestion` tool — interactive user prompting.
//!
//! Presents questions with options to the user. This is an interactive,
//! turn-stopping tool: execution returns immediately and the user's answer
//! arrives as the next prompt.

use async_trait::async_trait;
use serde_json::{json, Value};
use tron_core::tools::{
    Tool, ToolCategory, ToolParameterSchema, ToolResultBody, TronToolResult, error_result,
};

use std::fmt::Write;

use crate::errors::ToolError;
use crate::traits::{ToolContext, TronTool};
use crate::utils::validation::get_optional_string;

const MAX_QUESTIONS: usize = 5;
const MIN_OPTIONS: usize = 2;

/// The `AskUserQuestion` tool presents interactive questions to the user.
pub struct AskUserQuestionTool;

impl AskUserQuestionTool {
    /// Create a new `AskUserQuestion` tool.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AskUserQuestionTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TronTool for AskUserQuestionTool {
    fn name(&self) -> &str {
        "AskUserQuestion"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Custom
    }

    fn is_interactive(&self) -> bool {
        true
    }

    fn stops_turn(&self) -> bool {
        true
    }

    fn definition(&self) -> Tool {
        Tool {
            name: "AskUserQuestion".into(),
            description: "Present questions with options to the user.".into(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some({
                    let mut m = serde_json::Map::new();
                    let _ = m.insert("questions".into(), json!({
                        "type": "array",
                        "description": "Array of questions (1-5) with options",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string"},
                                "question": {"type": "string"},
                                "options": {"type": "array", "items": {"type": "string"}},
                                "mode": {"type": "string", "enum": ["single", "multi"]}
                            }
                        }
                    }));
                    let _ = m.insert("context".into(), json!({"type": "string", "description": "Additional context for the questions"}));
                    m
                }),
                required: Some(vec!["questions".into()]),
                description: None,
                extra: serde_json::Map::new(),
            },
        }
    }

    async fn execute(
        &self,
        params: Value,
        _ctx: &ToolContext,
    ) -> Result<TronToolResult, ToolError> {
        let Some(questions) = params.get("questions").and_then(Value::as_array) else {
            return Ok(error_result("Missing required parameter: questions"));
        };

        if questions.is_empty() {
            return Ok(error_result("At least one question is required"));
        }

        if questions.len() > MAX_QUESTIONS {
            return Ok(error_result(format!("Maximum {MAX_QUESTIONS} questions allowed")));
        }

        // Validate each question has enough options
        for (i, q) in questions.iter().enumerate() {
            let options = q.get("options").and_then(Value::as_array);
            if let Some(opts) = options {
                if opts.len() < MIN_OPTIONS {
                    return Ok(error_result(format!("Question {} must have at least {MIN_OPTIONS} options", i + 1)));
                }
            }
        }

        let context = get_optional_string(&params, "context");

        // Format summary
        let mut summary = String::new();
        for (i, q) in questions.iter().enumerate() {
            let text = q.get("question").and_then(Value::as_str).unwrap_or("(no question)");
            let mode = q.get("mode").and_then(Value::as_str).unwrap_or("single");
            let _ = writeln!(summary, "Q{}: {text} [{mode}]", i + 1);
        }

        if let Some(ctx) = &context {
            let _ = write!(summary, "\nContext: {ctx}");
        }

        Ok(TronToolResult {
            content: ToolResultBody::Blocks(vec![
                tron_core::content::ToolResultContent::text(summary),
            ]),
            details: Some(json!({
                "questionCount": questions.len(),
                "context": context,
            })),
            is_error: None,
            stop_turn: Some(true),
        })
    }
}
