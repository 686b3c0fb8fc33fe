//! # Model Registry
//!
//! Unified model registry for provider detection, model lookup, and capability queries.

use super::catalog::{get_claude_model, get_gemini_model, get_openai_model};
use super::model_ids::{ALL_ANTHROPIC_MODEL_IDS, ALL_GOOGLE_MODEL_IDS, ALL_OPENAI_MODEL_IDS};
use tron_core::messages::ProviderType;

/// Detect which provider serves a given model ID.
///
/// Resolution order:
/// 1. Explicit prefix (e.g., `"openai/gpt-5"` → `OpenAi`)
/// 2. Registry lookup (exact match against known model IDs)
///
/// Unknown model IDs always return `None` (strict fail-fast behavior).
pub fn detect_provider_from_model(model_id: &str) -> Option<ProviderType> {
    // 1. Explicit prefix: "provider/model". Prefix is accepted only when the
    // bare model exists in that provider's registry.
    if let Some((prefix, bare_model)) = model_id.split_once('/') {
        return match prefix {
            "anthropic" if ALL_ANTHROPIC_MODEL_IDS.contains(&bare_model) => {
                Some(ProviderType::Anthropic)
            }
            "openai" | "openai-codex" if ALL_OPENAI_MODEL_IDS.contains(&bare_model) => {
                Some(ProviderType::OpenAi)
            }
            "google" | "gemini" if ALL_GOOGLE_MODEL_IDS.contains(&bare_model) => {
                Some(ProviderType::Google)
            }
            _ => None,
        };
    }

    // 2. Registry lookup (exact match)
    if ALL_ANTHROPIC_MODEL_IDS.contains(&model_id) {
        return Some(ProviderType::Anthropic);
    }
    if ALL_OPENAI_MODEL_IDS.contains(&model_id) {
        return Some(ProviderType::OpenAi);
    }
    if ALL_GOOGLE_MODEL_IDS.contains(&model_id) {
        return Some(ProviderType::Google);
    }

    // Unknown model.
    None
}

/// Strip the explicit provider prefix from a model ID, if present.
///
/// `"openai/gpt-5.3-codex"` → `"gpt-5.3-codex"`
/// `"claude-opus-4-6"` → `"claude-opus-4-6"` (unchanged)
#[must_use]
pub fn strip_provider_prefix(model_id: &str) -> &str {
    model_id
        .split_once('/')
        .map_or(model_id, |(_, model)| model)
}

/// Check if a model ID is recognized by any provider.
#[must_use]
pub fn is_model_supported(model_id: &str) -> bool {
    let bare = strip_provider_prefix(model_id);
    ALL_ANTHROPIC_MODEL_IDS.contains(&bare)
        || ALL_OPENAI_MODEL_IDS.contains(&bare)
        || ALL_GOOGLE_MODEL_IDS.contains(&bare)
}

/// Check if a model supports image inputs.
///
/// Looks up all three provider registries. Unknown models default to `true`.
#[must_use]
pub fn model_supports_images(model_id: &str) -> bool {
    let bare = strip_provider_prefix(model_id);
    if let Some(m) = get_claude_model(bare) {
        return m.supports_images;
    }
    if let Some(m) = get_openai_model(bare) {
        return m.supports_images;
    }
    if let Some(m) = get_gemini_model(bare) {
        return m.supports_images;
    }
    true
}

/// Get all known model IDs across all providers.
#[must_use]
pub fn all_model_ids() -> Vec<&'static str> {
    let mut ids = Vec::with_capacity(
        ALL_ANTHROPIC_MODEL_IDS.len() + ALL_OPENAI_MODEL_IDS.len() + ALL_GOOGLE_MODEL_IDS.len(),
    );
    ids.extend_from_slice(ALL_ANTHROPIC_MODEL_IDS);
    ids.extend_from_slice(ALL_OPENAI_MODEL_IDS);
    ids.extend_from_slice(ALL_GOOGLE_MODEL_IDS);
    ids
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
