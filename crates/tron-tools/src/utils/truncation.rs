//! Token-based output truncation with line preservation.
//!
//! Estimates token counts from character length (4 chars ≈ 1 token) and truncates
//! output while preserving configurable start/end lines.

/// Default characters per token for estimation.
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Estimate token count from character count.
pub fn estimate_tokens(chars: usize) -> usize {
    chars.div_ceil(DEFAULT_CHARS_PER_TOKEN)
}

/// Convert token count to character budget.
pub fn tokens_to_chars(tokens: usize) -> usize {
    tokens * DEFAULT_CHARS_PER_TOKEN
}

/// Options controlling truncation behavior.
#[derive(Clone, Debug, Default)]
pub struct TruncateOptions {
    /// Number of lines to preserve at the start.
    pub preserve_start_lines: usize,
    /// Number of lines to preserve at the end.
    pub preserve_end_lines: usize,
    /// Custom truncation indicator message.
    pub truncation_message: Option<String>,
}

/// Truncate output to fit within a token budget.
///
/// If the output fits within `max_tokens`, returns it unchanged.
/// Otherwise, preserves the first `preserve_start_lines` and last
/// `preserve_end_lines`, inserting a truncation indicator in the middle.
pub fn truncate_output(output: &str, max_tokens: usize, options: &TruncateOptions) -> String {
    let original_tokens = estimate_tokens(output.len());

    if original_tokens <= max_tokens {
        return output.to_owned();
    }

    let max_chars = tokens_to_chars(max_tokens);
    let lines: Vec<&str> = output.lines().collect();

    let message = options
        .truncation_message
        .clone()
        .unwrap_or_else(|| {
            format!(
                "\n... [output truncated: {original_tokens} tokens exceeded {max_tokens} token budget] ...\n"
            )
        });

    let message_chars = message.len();

    // If we have preserve directives and enough lines
    if (options.preserve_start_lines > 0 || options.preserve_end_lines > 0) && lines.len() > 1 {
        let start_count = options.preserve_start_lines.min(lines.len());
        let end_count = options
            .preserve_end_lines
            .min(lines.len().saturating_sub(start_count));

        let start_part = lines[..start_count].join("\n");
        let end_part = if end_count > 0 {
            lines[lines.len() - end_count..].join("\n")
        } else {
            String::new()
        };

        return if end_part.is_empty() {
            format!("{start_part}{message}")
        } else {
            format!("{start_part}{message}{end_part}")
        };
    }

    // Simple character-based truncation (UTF-8–safe)
    let available = max_chars.saturating_sub(message_chars);
    if available > 0 && available < output.len() {
        let safe_slice = tron_core::text::truncate_str(output, available);
        // Try to break at a line boundary
        let break_at = safe_slice.rfind('\n').map_or(safe_slice.len(), |pos| pos);
        format!("{}{message}", &output[..break_at])
    } else {
        message
    }
}
