//! Per-model context window lookup, used to seed `ContextManagerConfig`.

use tron_llm::models::{get_claude_model, get_gemini_model, get_openai_model, strip_provider_prefix};

const FALLBACK_CONTEXT_LIMIT: u64 = 200_000;

/// Context window size for a model ID, falling back to a conservative default
/// for models not present in the registry.
#[must_use]
pub fn context_limit_for_model(model: &str) -> u64 {
    let bare = strip_provider_prefix(model);
    get_claude_model(bare)
        .map(|m| m.context_window)
        .or_else(|| get_openai_model(bare).map(|m| m.context_window))
        .or_else(|| get_gemini_model(bare).map(|m| m.context_window))
        .unwrap_or(FALLBACK_CONTEXT_LIMIT)
}
