//! Context snapshot builder.
//!
//! Generates [`ContextSnapshot`] and [`DetailedContextSnapshot`] from injected
//! dependencies. Pure read-only — never modifies state.

use tron_core::content::AssistantContent;
use tron_core::messages::Message;

use crate::token_estimator::estimate_message_tokens;
use crate::types::{
    ContextSnapshot, DetailedContextSnapshot, DetailedMessageInfo, ThresholdLevel, TokenBreakdown,
    ToolCallInfo,
};

// =============================================================================
// Dependencies trait
// =============================================================================

/// Injected dependencies from the context manager.
///
/// Allows the builder to query current state without owning it.
pub trait SnapshotDeps: Send + Sync {
    /// API-reported token count, or component-sum estimate.
    fn get_current_tokens(&self) -> u64;
    /// Model's context limit.
    fn get_context_limit(&self) -> u64;
    /// Current messages.
    fn get_messages(&self) -> Vec<Message>;
    /// Estimated system prompt tokens.
    fn estimate_system_prompt_tokens(&self) -> u64;
    /// Estimated tools tokens.
    fn estimate_tools_tokens(&self) -> u64;
    /// Estimated rules tokens.
    fn estimate_rules_tokens(&self) -> u64;
    /// Total message tokens from the message store.
    fn get_messages_tokens(&self) -> u64;
    /// Token estimate for a single message.
    fn get_message_tokens(&self, msg: &Message) -> u64;
    /// The effective system prompt text.
    fn get_system_prompt(&self) -> String;
    /// Tool clarification text (Codex mode).
    fn get_tool_clarification(&self) -> Option<String>;
    /// Tool names for the detailed snapshot.
    fn get_tool_names(&self) -> Vec<String>;
}

// =============================================================================
// ContextSnapshotBuilder
// =============================================================================

/// Builds context snapshots from injected dependencies.
pub struct ContextSnapshotBuilder<D: SnapshotDeps> {
    deps: D,
}

impl<D: SnapshotDeps> ContextSnapshotBuilder<D> {
    /// Create a new snapshot builder with the given dependencies.
    pub fn new(deps: D) -> Self {
        Self { deps }
    }

    /// Build a basic context snapshot.
    #[must_use]
    pub fn build(&self) -> ContextSnapshot {
        let current_tokens = self.deps.get_current_tokens();
        let context_limit = self.deps.get_context_limit();

        #[allow(clippy::cast_precision_loss)]
        let usage_percent = if context_limit > 0 {
            current_tokens as f64 / context_limit as f64
        } else {
            0.0
        };

        let threshold_level = ThresholdLevel::from_ratio(usage_percent);

        ContextSnapshot {
            current_tokens,
            context_limit,
            usage_percent,
            threshold_level,
            breakdown: TokenBreakdown {
                system_prompt: self.deps.estimate_system_prompt_tokens(),
                tools: self.deps.estimate_tools_tokens(),
                rules: self.deps.estimate_rules_tokens(),
                messages: self.deps.get_messages_tokens(),
            },
            rules: None,
        }
    }

    /// Build a detailed snapshot with per-message breakdown.
    #[must_use]
    pub fn build_detailed(&self) -> DetailedContextSnapshot {
        let snapshot = self.build();
        let messages = self.deps.get_messages();

        let detailed_messages: Vec<DetailedMessageInfo> = messages
            .iter()
            .enumerate()
            .map(|(index, msg)| build_message_info(msg, index, self.deps.get_message_tokens(msg)))
            .collect();

        DetailedContextSnapshot {
            snapshot,
            messages: detailed_messages,
            system_prompt_content: self.deps.get_system_prompt(),
            tool_clarification_content: self.deps.get_tool_clarification(),
            tools_content: self.deps.get_tool_names(),
        }
    }
}

// =============================================================================
// Message info builder
// =============================================================================

fn build_message_info(msg: &Message, index: usize, tokens: u64) -> DetailedMessageInfo {
    match msg {
        Message::User { content, .. } => {
            let text = match content {
                tron_core::messages::UserMessageContent::Text(t) => t.clone(),
                tron_core::messages::UserMessageContent::Blocks(blocks) => blocks
                    .iter()
                    .filter_map(|b| b.as_text())
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            DetailedMessageInfo {
                index,
                role: "user".into(),
                tokens,
                summary: summarize_content(&text, 100),
                content: text,
                event_id: None,
                tool_calls: None,
                tool_call_id: None,
                is_error: None,
            }
        }
        Message::Assistant { content, .. } => {
            let mut text_parts = Vec::new();
            let mut tool_calls = Vec::new();

            for block in content {
                match block {
                    AssistantContent::Text { text } => {
                        text_parts.push(text.clone());
                    }
                    AssistantContent::ToolUse {
                        id,
                        name,
                        arguments,
                        ..
                    } => {
                        let args_str = serde_json::to_string(arguments).unwrap_or_default();
                        tool_calls.push(ToolCallInfo {
                            id: id.clone(),
                            name: name.clone(),
                            tokens: u64::from(estimate_message_tokens(msg)),
                            arguments: args_str,
                        });
                    }
                    AssistantContent::Thinking { .. } => {}
                }
            }

            let full_text = text_parts.join("\n");
            DetailedMessageInfo {
                index,
                role: "assistant".into(),
                tokens,
                summary: summarize_content(&full_text, 100),
                content: full_text,
                event_id: None,
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
                is_error: None,
            }
        }
        Message::ToolResult {
            tool_call_id,
            content,
            is_error,
        } => {
            let text = match content {
                tron_core::messages::ToolResultMessageContent::Text(t) => t.clone(),
                tron_core::messages::ToolResultMessageContent::Blocks(blocks) => blocks
                    .iter()
                    .filter_map(|b| match b {
                        tron_core::content::ToolResultContent::Text { text } => {
                            Some(text.as_str())
                        }
                        tron_core::content::ToolResultContent::Image { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            DetailedMessageInfo {
                index,
                role: "tool_result".into(),
                tokens,
                summary: summarize_content(&text, 100),
                content: text,
                event_id: None,
                tool_calls: None,
                tool_call_id: Some(tool_call_id.clone()),
                is_error: *is_error,
            }
        }
    }
}

/// Truncate content for display, appending "..." if truncated.
fn summarize_content(text: &str, max_len: usize) -> String {
    tron_core::text::truncate_with_suffix(text, max_len, "...")
}

// =============================================================================
// Tests
// =============================================================================
