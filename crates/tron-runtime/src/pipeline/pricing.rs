//! Cost calculation — pricing tables and per-request cost computation.
//!
//! Pricing tiers are per-million tokens with cache multipliers.

use tron_core::messages::TokenUsage;

/// Pricing tier per million tokens.
struct PricingTier {
    input_per_million: f64,
    output_per_million: f64,
    cache_write_5m_multiplier: f64,
    cache_write_1h_multiplier: f64,
    cache_read_multiplier: f64,
}

// ─── Anthropic ───────────────────────────────────────────────────────────────

const OPUS_4_6: PricingTier = PricingTier {
    input_per_million: 5.0,
    output_per_million: 25.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const OPUS_4_5: PricingTier = PricingTier {
    input_per_million: 5.0,
    output_per_million: 25.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const SONNET_4_5: PricingTier = PricingTier {
    input_per_million: 3.0,
    output_per_million: 15.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const HAIKU_4_5: PricingTier = PricingTier {
    input_per_million: 1.0,
    output_per_million: 5.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const OPUS_4_1: PricingTier = PricingTier {
    input_per_million: 15.0,
    output_per_million: 75.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const OPUS_4: PricingTier = PricingTier {
    input_per_million: 15.0,
    output_per_million: 75.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const SONNET_4: PricingTier = PricingTier {
    input_per_million: 3.0,
    output_per_million: 15.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const SONNET_3_7: PricingTier = PricingTier {
    input_per_million: 3.0,
    output_per_million: 15.0,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

const HAIKU_3: PricingTier = PricingTier {
    input_per_million: 0.25,
    output_per_million: 1.25,
    cache_write_5m_multiplier: 1.25,
    cache_write_1h_multiplier: 2.0,
    cache_read_multiplier: 0.1,
};

// ─── Google ──────────────────────────────────────────────────────────────────

const GEMINI_PRO: PricingTier = PricingTier {
    input_per_million: 1.25,
    output_per_million: 5.0,
    cache_write_5m_multiplier: 1.0,
    cache_write_1h_multiplier: 1.0,
    cache_read_multiplier: 0.25,
};

const GEMINI_FLASH: PricingTier = PricingTier {
    input_per_million: 0.075,
    output_per_million: 0.3,
    cache_write_5m_multiplier: 1.0,
    cache_write_1h_multiplier: 1.0,
    cache_read_multiplier: 0.25,
};

/// Look up the pricing tier for a model.
///
/// Tries exact match first, then pattern-matches on model family substrings.
/// Returns `None` for unknown models (no implicit fallback pricing).
fn get_pricing_tier(model: &str) -> Option<&'static PricingTier> {
    use tron_llm::models::model_ids::{
        CLAUDE_3_7_SONNET, CLAUDE_3_HAIKU, CLAUDE_HAIKU_4_5, CLAUDE_OPUS_4, CLAUDE_OPUS_4_1,
        CLAUDE_OPUS_4_5, CLAUDE_OPUS_4_6, CLAUDE_SONNET_4, CLAUDE_SONNET_4_5, GEMINI_2_5_FLASH,
        GEMINI_2_5_PRO, GEMINI_3_FLASH_PREVIEW, GEMINI_3_PRO_PREVIEW,
    };

    // Exact match
    match model {
        CLAUDE_OPUS_4_6 => return Some(&OPUS_4_6),
        CLAUDE_OPUS_4_5 => return Some(&OPUS_4_5),
        CLAUDE_SONNET_4_5 => return Some(&SONNET_4_5),
        CLAUDE_HAIKU_4_5 => return Some(&HAIKU_4_5),
        CLAUDE_OPUS_4_1 => return Some(&OPUS_4_1),
        CLAUDE_OPUS_4 => return Some(&OPUS_4),
        CLAUDE_SONNET_4 => return Some(&SONNET_4),
        CLAUDE_3_7_SONNET => return Some(&SONNET_3_7),
        CLAUDE_3_HAIKU => return Some(&HAIKU_3),
        GEMINI_3_PRO_PREVIEW | GEMINI_2_5_PRO => return Some(&GEMINI_PRO),
        GEMINI_3_FLASH_PREVIEW | GEMINI_2_5_FLASH => return Some(&GEMINI_FLASH),
        _ => {}
    }

    // Pattern matching on model family substrings
    let lower = model.to_lowercase();

    if lower.contains("opus-4-6") || lower.contains("opus-4.6") {
        return Some(&OPUS_4_6);
    }
    if lower.contains("opus-4-5") || lower.contains("opus-4.5") {
        return Some(&OPUS_4_5);
    }
    if lower.contains("opus") {
        return Some(&OPUS_4);
    }
    if lower.contains("sonnet-4-5") || lower.contains("sonnet-4.5") {
        return Some(&SONNET_4_5);
    }
    if lower.contains("sonnet") {
        return Some(&SONNET_4);
    }
    if lower.contains("haiku-4-5") || lower.contains("haiku-4.5") {
        return Some(&HAIKU_4_5);
    }
    if lower.contains("haiku") {
        return Some(&HAIKU_3);
    }
    if lower.contains("gemini-2.5-pro") || lower.contains("gemini-3-pro") {
        return Some(&GEMINI_PRO);
    }
    if lower.contains("gemini") {
        return Some(&GEMINI_FLASH);
    }

    None
}

/// Calculate cost for a single API request.
///
/// Returns the total cost in USD, or `None` when pricing is unavailable.
pub fn calculate_cost(model: &str, usage: &TokenUsage) -> Option<f64> {
    let pricing = get_pricing_tier(model)?;

    #[allow(clippy::cast_precision_loss)]
    let input_tokens = usage.input_tokens as f64;
    #[allow(clippy::cast_precision_loss)]
    let output_tokens = usage.output_tokens as f64;
    #[allow(clippy::cast_precision_loss)]
    let cache_creation_tokens = usage.cache_creation_tokens.unwrap_or(0) as f64;
    #[allow(clippy::cast_precision_loss)]
    let cache_read_tokens = usage.cache_read_tokens.unwrap_or(0) as f64;
    #[allow(clippy::cast_precision_loss)]
    let cache_write_short = usage.cache_creation_5m_tokens.unwrap_or(0) as f64;
    #[allow(clippy::cast_precision_loss)]
    let cache_write_long = usage.cache_creation_1h_tokens.unwrap_or(0) as f64;

    // Base input tokens (excluding cache tokens billed separately)
    let base_input_tokens = (input_tokens - cache_read_tokens - cache_creation_tokens).max(0.0);
    let base_input_cost = (base_input_tokens / 1_000_000.0) * pricing.input_per_million;

    // Cache creation cost — use per-TTL pricing when breakdown is available
    let cache_creation_cost = if cache_write_short > 0.0 || cache_write_long > 0.0 {
        let short_cost = (cache_write_short / 1_000_000.0)
            * pricing.input_per_million
            * pricing.cache_write_5m_multiplier;
        let long_cost = (cache_write_long / 1_000_000.0)
            * pricing.input_per_million
            * pricing.cache_write_1h_multiplier;
        short_cost + long_cost
    } else {
        // Backward compat: fall back to 5m multiplier for total
        (cache_creation_tokens / 1_000_000.0)
            * pricing.input_per_million
            * pricing.cache_write_5m_multiplier
    };

    // Cache read cost (discounted rate)
    let cache_read_cost = (cache_read_tokens / 1_000_000.0)
        * pricing.input_per_million
        * pricing.cache_read_multiplier;

    let total_input_cost = base_input_cost + cache_creation_cost + cache_read_cost;

    // Output cost
    let output_cost = (output_tokens / 1_000_000.0) * pricing.output_per_million;

    Some(total_input_cost + output_cost)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
