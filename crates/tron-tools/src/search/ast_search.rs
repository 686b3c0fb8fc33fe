//! AST search engine — structural code search via `ast-grep`.
//!
//! Spawns the `sg` binary with the given AST pattern, parses JSON output,
//! and formats results as `file:line: code`.

use std::fmt::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::ToolError;
use crate::traits::{ProcessOptions, ProcessRunner};

const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_MAX_RESULTS: usize = 50;

/// Result of an AST search operation.
pub struct AstSearchResult {
    /// Formatted output text.
    pub output: String,
    /// Number of matches shown.
    pub matches: usize,
    /// Total matches found by `ast-grep`.
    pub total_matches: usize,
    /// Whether results were truncated.
    pub truncated: bool,
}

/// Run an AST search using `ast-grep` (`sg` binary).
pub async fn ast_search(
    runner: &Arc<dyn ProcessRunner>,
    search_path: &str,
    pattern: &str,
    file_pattern: Option<&str>,
    max_results: Option<usize>,
    working_directory: &str,
) -> Result<AstSearchResult, ToolError> {
    let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    let mut command = format!("sg --json --pattern {}", shell_escape(pattern));
    if let Some(fp) = file_pattern {
        let _ = write!(command, " --glob {}", shell_escape(fp));
    }
    command.push(' ');
    command.push_str(search_path);

    let opts = ProcessOptions {
        working_directory: working_directory.to_string(),
        timeout_ms: DEFAULT_TIMEOUT_MS,
        cancellation: tokio_util::sync::CancellationToken::new(),
        env: std::collections::HashMap::new(),
    };

    let output = runner.run_command(&command, &opts).await?;

    // Check for binary-not-found errors
    if output.exit_code != 0 {
        let stderr = output.stderr.to_lowercase();
        if stderr.contains("not found") || stderr.contains("command not found") {
            return Ok(AstSearchResult {
                output: "ast-grep is not installed. Install it with: brew install ast-grep".into(),
                matches: 0,
                total_matches: 0,
                truncated: false,
            });
        }

        // Exit code 1 from sg means "no matches" — not an error
        if output.exit_code == 1 && output.stdout.trim().is_empty() {
            return Ok(AstSearchResult {
                output: format!("No AST matches found for pattern: {pattern}"),
                matches: 0,
                total_matches: 0,
                truncated: false,
            });
        }
    }

    // Parse JSON output
    let stdout = if output.stdout.is_empty() { "[]" } else { &output.stdout };
    let results: Vec<Value> = serde_json::from_str(stdout)
        .map_err(|e| ToolError::Internal { message: format!("Failed to parse ast-grep output: {e}") })?;

    let total_matches = results.len();

    if total_matches == 0 {
        return Ok(AstSearchResult {
            output: format!("No AST matches found for pattern: {pattern}"),
            matches: 0,
            total_matches: 0,
            truncated: false,
        });
    }

    let shown = results.iter().take(max_results);
    let mut formatted = String::new();
    let mut match_count = 0;

    for m in shown {
        let file = m.get("file").and_then(Value::as_str).unwrap_or("");
        let line = m.get("line").and_then(Value::as_u64).unwrap_or(0);
        let code = m.get("code")
            .or_else(|| m.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("");

        let _ = writeln!(formatted, "{file}:{line}: {code}");
        match_count += 1;
    }

    let truncated = total_matches > max_results;
    if truncated {
        let _ = writeln!(formatted, "\n[Showing {match_count} of {total_matches} results]");
    }

    Ok(AstSearchResult {
        output: formatted,
        matches: match_count,
        total_matches,
        truncated,
    })
}

/// Simple shell escaping — wraps in single quotes.
fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
