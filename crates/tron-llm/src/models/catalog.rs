//! # Model Catalog
//!
//! Static lookup tables of [`ModelInfo`] for every model ID known to the
//! registry. Replaces what a per-provider crate would otherwise own.

use super::model_ids::*;
use super::types::{ModelInfo, ModelTier, ProviderType};

fn info(
    id: &str,
    name: &str,
    short_name: &str,
    family: &str,
    provider: ProviderType,
    tier: ModelTier,
    context_window: u64,
    max_output: u64,
    supports_thinking: bool,
    supports_reasoning: bool,
    supports_images: bool,
    input_cost_per_million: f64,
    output_cost_per_million: f64,
) -> ModelInfo {
    ModelInfo {
        id: id.to_owned(),
        name: name.to_owned(),
        short_name: short_name.to_owned(),
        family: family.to_owned(),
        provider,
        tier,
        context_window,
        max_output,
        supports_thinking,
        supports_reasoning,
        supports_tools: true,
        supports_images,
        input_cost_per_million,
        output_cost_per_million,
        cache_read_cost_per_million: None,
        description: name.to_owned(),
        recommended: None,
        legacy: None,
        preview: None,
        release_date: None,
    }
}

/// Look up Claude model metadata by bare model ID.
#[must_use]
pub fn get_claude_model(model_id: &str) -> Option<ModelInfo> {
    Some(match model_id {
        CLAUDE_OPUS_4_6 => info(
            model_id,
            "Claude Opus 4.6",
            "Opus 4.6",
            "Claude 4.6",
            ProviderType::Anthropic,
            ModelTier::Opus,
            200_000,
            128_000,
            true,
            false,
            true,
            15.0,
            75.0,
        ),
        CLAUDE_OPUS_4_5 => info(
            model_id,
            "Claude Opus 4.5",
            "Opus 4.5",
            "Claude 4.5",
            ProviderType::Anthropic,
            ModelTier::Opus,
            200_000,
            64_000,
            true,
            false,
            true,
            15.0,
            75.0,
        ),
        CLAUDE_SONNET_4_5 => info(
            model_id,
            "Claude Sonnet 4.5",
            "Sonnet 4.5",
            "Claude 4.5",
            ProviderType::Anthropic,
            ModelTier::Sonnet,
            200_000,
            64_000,
            true,
            false,
            true,
            3.0,
            15.0,
        ),
        CLAUDE_HAIKU_4_5 => info(
            model_id,
            "Claude Haiku 4.5",
            "Haiku 4.5",
            "Claude 4.5",
            ProviderType::Anthropic,
            ModelTier::Haiku,
            200_000,
            64_000,
            true,
            false,
            true,
            1.0,
            5.0,
        ),
        CLAUDE_OPUS_4_1 => info(
            model_id,
            "Claude Opus 4.1",
            "Opus 4.1",
            "Claude 4",
            ProviderType::Anthropic,
            ModelTier::Opus,
            200_000,
            32_000,
            true,
            false,
            true,
            15.0,
            75.0,
        ),
        CLAUDE_OPUS_4 => info(
            model_id,
            "Claude Opus 4",
            "Opus 4",
            "Claude 4",
            ProviderType::Anthropic,
            ModelTier::Opus,
            200_000,
            32_000,
            true,
            false,
            true,
            15.0,
            75.0,
        ),
        CLAUDE_SONNET_4 => info(
            model_id,
            "Claude Sonnet 4",
            "Sonnet 4",
            "Claude 4",
            ProviderType::Anthropic,
            ModelTier::Sonnet,
            200_000,
            64_000,
            true,
            false,
            true,
            3.0,
            15.0,
        ),
        CLAUDE_3_7_SONNET => info(
            model_id,
            "Claude 3.7 Sonnet",
            "Sonnet 3.7",
            "Claude 3",
            ProviderType::Anthropic,
            ModelTier::Sonnet,
            200_000,
            64_000,
            true,
            false,
            true,
            3.0,
            15.0,
        ),
        CLAUDE_3_HAIKU => info(
            model_id,
            "Claude 3 Haiku",
            "Haiku 3",
            "Claude 3",
            ProviderType::Anthropic,
            ModelTier::Haiku,
            200_000,
            4_096,
            false,
            false,
            true,
            0.25,
            1.25,
        ),
        _ => return None,
    })
}

/// Look up `OpenAI` Codex-family model metadata by bare model ID.
#[must_use]
pub fn get_openai_model(model_id: &str) -> Option<ModelInfo> {
    Some(match model_id {
        GPT_5_3_CODEX => info(
            model_id,
            "GPT 5.3 Codex",
            "5.3 Codex",
            "GPT-5.3",
            ProviderType::OpenAi,
            ModelTier::Flagship,
            400_000,
            128_000,
            false,
            true,
            true,
            10.0,
            30.0,
        ),
        GPT_5_3_CODEX_SPARK => info(
            model_id,
            "GPT 5.3 Codex Spark",
            "5.3 Spark",
            "GPT-5.3",
            ProviderType::OpenAi,
            ModelTier::Standard,
            128_000,
            32_000,
            false,
            true,
            false,
            2.0,
            8.0,
        ),
        GPT_5_2_CODEX => info(
            model_id,
            "GPT 5.2 Codex",
            "5.2 Codex",
            "GPT-5.2",
            ProviderType::OpenAi,
            ModelTier::Flagship,
            400_000,
            128_000,
            false,
            true,
            true,
            10.0,
            30.0,
        ),
        GPT_5_1_CODEX_MAX => info(
            model_id,
            "GPT 5.1 Codex Max",
            "5.1 Max",
            "GPT-5.1",
            ProviderType::OpenAi,
            ModelTier::Flagship,
            400_000,
            128_000,
            false,
            true,
            true,
            10.0,
            30.0,
        ),
        GPT_5_1_CODEX_MINI => info(
            model_id,
            "GPT 5.1 Codex Mini",
            "5.1 Mini",
            "GPT-5.1",
            ProviderType::OpenAi,
            ModelTier::Standard,
            128_000,
            32_000,
            false,
            true,
            true,
            1.0,
            4.0,
        ),
        _ => return None,
    })
}

/// Look up Gemini model metadata by bare model ID.
#[must_use]
pub fn get_gemini_model(model_id: &str) -> Option<ModelInfo> {
    Some(match model_id {
        GEMINI_3_PRO_PREVIEW => info(
            model_id,
            "Gemini 3 Pro",
            "3 Pro",
            "Gemini 3",
            ProviderType::Google,
            ModelTier::Pro,
            1_048_576,
            65_536,
            true,
            false,
            true,
            2.5,
            15.0,
        ),
        GEMINI_3_FLASH_PREVIEW => info(
            model_id,
            "Gemini 3 Flash",
            "3 Flash",
            "Gemini 3",
            ProviderType::Google,
            ModelTier::Flash,
            1_048_576,
            65_536,
            true,
            false,
            true,
            0.3,
            2.5,
        ),
        GEMINI_2_5_PRO => info(
            model_id,
            "Gemini 2.5 Pro",
            "2.5 Pro",
            "Gemini 2.5",
            ProviderType::Google,
            ModelTier::Pro,
            1_048_576,
            65_536,
            true,
            false,
            true,
            1.25,
            10.0,
        ),
        GEMINI_2_5_FLASH => info(
            model_id,
            "Gemini 2.5 Flash",
            "2.5 Flash",
            "Gemini 2.5",
            ProviderType::Google,
            ModelTier::Flash,
            1_048_576,
            65_536,
            true,
            false,
            true,
            0.3,
            2.5,
        ),
        GEMINI_2_5_FLASH_LITE => info(
            model_id,
            "Gemini 2.5 Flash Lite",
            "2.5 Lite",
            "Gemini 2.5",
            ProviderType::Google,
            ModelTier::FlashLite,
            1_048_576,
            65_536,
            false,
            false,
            true,
            0.1,
            0.4,
        ),
        _ => return None,
    })
}
