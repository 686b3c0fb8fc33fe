//! `receive_messages` tool — receives inter-session messages.
//!
//! Checks for messages sent to this session from other agents. Supports
//! filtering by type and sender, with optional mark-as-read behavior.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tron_core::tools::{Tool, ToolCategory, ToolParameterSchema, ToolResultBody, TronToolResult};

use crate::errors::ToolError;
use crate::traits::{MessageBus, MessageFilter, ToolContext, TronTool};
use crate::utils::validation::{get_optional_bool, get_optional_string, get_optional_u64};

const DEFAULT_LIMIT: u32 = 20;

/// The `receive_messages` tool checks for messages from other agents.
pub struct ReceiveMessagesTool {
    bus: Arc<dyn MessageBus>,
}

impl ReceiveMessagesTool {
    /// Create a new `receive_messages` tool with the given message bus.
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl TronTool for ReceiveMessagesTool {
    fn name(&self) -> &str {
        "receive_messages"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Custom
    }

    fn definition(&self) -> Tool {
        Tool {
            name: "receive_messages".into(),
            description: "Check for messages sent to this session from other agents. Can filter by type or sender.".into(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some({
                    let mut m = serde_json::Map::new();
                    let _ = m.insert("type".into(), json!({"type": "string", "description": "Filter by message type"}));
                    let _ = m.insert("fromSessionId".into(), json!({"type": "string", "description": "Filter by sender session ID"}));
                    let _ = m.insert("limit".into(), json!({"type": "number", "description": "Maximum messages to return (default: 20)"}));
                    let _ = m.insert("markAsRead".into(), json!({"type": "boolean", "description": "Whether to mark returned messages as read (default: true)"}));
                    m
                }),
                required: None,
                description: None,
                extra: serde_json::Map::new(),
            },
        }
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<TronToolResult, ToolError> {
        let message_type = get_optional_string(&params, "type");
        let from_session_id = get_optional_string(&params, "fromSessionId");
        let mark_as_read = get_optional_bool(&params, "markAsRead").unwrap_or(true);
        #[allow(clippy::cast_possible_truncation)]
        let limit = get_optional_u64(&params, "limit").map_or(DEFAULT_LIMIT, |v| v as u32);

        let filter = MessageFilter {
            message_type,
            from_session_id,
            mark_as_read,
            limit: Some(limit),
        };

        match self.bus.receive_messages(&ctx.session_id, &filter).await {
            Ok(messages) => {
                if messages.is_empty() {
                    return Ok(TronToolResult {
                        content: ToolResultBody::Blocks(vec![
                            tron_core::content::ToolResultContent::text("No messages found."),
                        ]),
                        details: Some(json!({
                            "messages": [],
                            "count": 0,
                        })),
                        is_error: None,
                        stop_turn: None,
                    });
                }

                let summary = messages
                    .iter()
                    .map(|m| {
                        let payload_str = serde_json::to_string(&m.payload).unwrap_or_default();
                        let truncated =
                            tron_core::text::truncate_with_suffix(&payload_str, 103, "...");
                        format!(
                            "- [{}] from {}: {}",
                            m.message_type, m.from_session_id, truncated
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");

                let content = format!("Found {} messages:\n{summary}", messages.len());

                let msg_details: Vec<Value> = messages
                    .iter()
                    .map(|m| {
                        json!({
                            "messageId": m.message_id,
                            "fromSessionId": m.from_session_id,
                            "messageType": m.message_type,
                            "payload": m.payload,
                            "timestamp": m.timestamp,
                        })
                    })
                    .collect();

                Ok(TronToolResult {
                    content: ToolResultBody::Blocks(vec![
                        tron_core::content::ToolResultContent::text(content),
                    ]),
                    details: Some(json!({
                        "messages": msg_details,
                        "count": messages.len(),
                    })),
                    is_error: None,
                    stop_turn: None,
                })
            }
            Err(e) => Ok(tron_core::tools::error_result(format!(
                "Failed to receive messages: {e}"
            ))),
        }
    }
}
