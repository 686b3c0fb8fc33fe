//! `WaitForAgents` tool — waits for subagent completion.
//!
//! Waits for one or more subagent sessions to complete, with configurable
//! mode (all/any) and timeout.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tron_core::tools::{
    Tool, ToolCategory, ToolParameterSchema, ToolResultBody, TronToolResult, error_result,
};

use crate::errors::ToolError;
use crate::traits::{SubagentSpawner, ToolContext, TronTool, WaitMode};
use crate::utils::validation::get_optional_string;

const DEFAULT_TIMEOUT_MS: u64 = 300_000; // 5 minutes

/// The `WaitForAgents` tool waits for subagent sessions to complete.
pub struct WaitForAgentsTool {
    spawner: Arc<dyn SubagentSpawner>,
}

impl WaitForAgentsTool {
    /// Create a new `WaitForAgents` tool with the given spawner.
    pub fn new(spawner: Arc<dyn SubagentSpawner>) -> Self {
        Self { spawner }
    }
}

#[async_trait]
impl TronTool for WaitForAgentsTool {
    fn name(&self) -> &str {
        "WaitForAgents"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Custom
    }

    fn definition(&self) -> Tool {
        Tool {
            name: "WaitForAgents".into(),
            description: "Wait for one or more subagent sessions to complete.".into(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some({
                    let mut m = serde_json::Map::new();
                    let _ = m.insert("sessionIds".into(), json!({"type": "array", "items": {"type": "string"}, "description": "Session IDs to wait for"}));
                    let _ = m.insert("mode".into(), json!({"type": "string", "enum": ["all", "any"], "description": "Wait mode: all or any (default: all)"}));
                    let _ = m.insert("timeout".into(), json!({"type": "number", "description": "Timeout in milliseconds (default: 300000)"}));
                    m
                }),
                required: Some(vec!["sessionIds".into()]),
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
        let session_ids = match params.get("sessionIds").and_then(Value::as_array) {
            Some(arr) => arr
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect::<Vec<_>>(),
            None => return Ok(error_result("Missing required parameter: sessionIds")),
        };

        if session_ids.is_empty() {
            return Ok(error_result("sessionIds must contain at least one session ID"));
        }

        let mode_str = get_optional_string(&params, "mode").unwrap_or_else(|| "all".into());
        let mode = match mode_str.as_str() {
            "all" => WaitMode::All,
            "any" => WaitMode::Any,
            _ => return Ok(error_result(format!(
                "Invalid mode: \"{mode_str}\". Must be \"all\" or \"any\"."
            ))),
        };

        let timeout_ms = params
            .get("timeout")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        match self
            .spawner
            .wait_for_agents(&session_ids, mode.clone(), timeout_ms)
            .await
        {
            Ok(results) => {
                let summary = results
                    .iter()
                    .map(|r| {
                        let truncated = if r.output.len() > 200 {
                            format!("{}...", &r.output[..200])
                        } else {
                            r.output.clone()
                        };
                        format!(
                            "[{}] {} ({}ms): {}",
                            r.status, r.session_id, r.duration_ms, truncated
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");

                let details: Vec<Value> = results
                    .iter()
                    .map(|r| {
                        json!({
                            "sessionId": r.session_id,
                            "status": r.status,
                            "durationMs": r.duration_ms,
                            "tokenUsage": r.token_usage,
                        })
                    })
                    .collect();

                Ok(TronToolResult {
                    content: ToolResultBody::Blocks(vec![
                        tron_core::content::ToolResultContent::text(summary),
                    ]),
                    details: Some(json!({
                        "mode": mode,
                        "results": details,
                    })),
                    is_error: None,
                    stop_turn: None,
                })
            }
            Err(e) => Ok(error_result(format!("Wait failed: {e}"))),
        }
    }
}
