//! Persistence helpers — build JSON structures for event payloads.
//!
//! These transform Rust types into the JSON shapes that the event store
//! and iOS client expect. The key fix: provider type is now **dynamic**
//! (not hardcoded to "anthropic").

use serde_json::{json, Value};
use tron_core::content::AssistantContent;
use tron_core::messages::TokenUsage;
use tron_llm::models::types::ProviderType;

/// Build a JSON content array from assistant content blocks.
///
/// Renames `arguments` → `input` on `tool_use` blocks (Anthropic API wire format
/// that iOS expects).
pub fn build_content_json(content: &[AssistantContent]) -> Vec<Value> {
    content.iter().map(content_block_to_json).collect()
}

/// Build `tokenUsage` JSON from a [`TokenUsage`] struct.
pub fn build_token_usage_json(usage: &TokenUsage) -> Value {
    let mut obj = json!({
        "inputTokens": usage.input_tokens,
        "outputTokens": usage.output_tokens,
    });
    let m = obj.as_object_mut().unwrap();
    if let Some(cr) = usage.cache_read_tokens {
        let _ = m.insert("cacheReadInputTokens".into(), json!(cr));
    }
    if let Some(cc) = usage.cache_creation_tokens {
        let _ = m.insert("cacheCreationInputTokens".into(), json!(cc));
    }
    obj
}

/// Build the nested `tokenRecord` structure for iOS compatibility.
///
/// Provider type is **dynamic** — uses the actual provider, not hardcoded "anthropic".
pub fn build_token_record(
    usage: &TokenUsage,
    provider_type: ProviderType,
    session_id: &str,
    turn: u32,
) -> Value {
    let now = chrono::Utc::now().to_rfc3339();
    let cr = usage.cache_read_tokens.unwrap_or(0);
    // New input = total input minus cached portion. cache_creation tokens are
    // NEW tokens written to cache (already part of non-cached input), so we
    // only subtract cache_read.
    let new_input = usage.input_tokens.saturating_sub(cr);

    json!({
        "source": {
            "rawInputTokens": usage.input_tokens,
            "rawOutputTokens": usage.output_tokens,
            "rawCacheReadTokens": cr,
            "rawCacheCreationTokens": usage.cache_creation_tokens.unwrap_or(0),
            "rawCacheCreation5mTokens": usage.cache_creation_5m_tokens.unwrap_or(0),
            "rawCacheCreation1hTokens": usage.cache_creation_1h_tokens.unwrap_or(0),
            "provider": provider_type.as_str(),
            "timestamp": now,
        },
        "computed": {
            "contextWindowTokens": usage.input_tokens + usage.output_tokens,
            "newInputTokens": new_input,
            "previousContextBaseline": 0,
            "calculationMethod": "default",
        },
        "meta": {
            "turn": turn,
            "sessionId": session_id,
            "extractedAt": now,
            "normalizedAt": now,
        }
    })
}

// ─── Internal helpers ────────────────────────────────────────────────────────

fn content_block_to_json(block: &AssistantContent) -> Value {
    match block {
        AssistantContent::Text { text } => {
            json!({ "type": "text", "text": text })
        }
        AssistantContent::Thinking {
            thinking,
            signature,
        } => {
            let mut obj = json!({ "type": "thinking", "thinking": thinking });
            if let Some(sig) = signature {
                obj["signature"] = json!(sig);
            }
            obj
        }
        AssistantContent::ToolUse {
            id,
            name,
            arguments,
            thought_signature,
        } => {
            // Rename "arguments" → "input" for iOS/Anthropic API wire format
            let mut obj = json!({
                "type": "tool_use",
                "id": id,
                "name": name,
                "input": Value::Object(arguments.clone()),
            });
            if let Some(sig) = thought_signature {
                obj["thoughtSignature"] = json!(sig);
            }
            obj
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
