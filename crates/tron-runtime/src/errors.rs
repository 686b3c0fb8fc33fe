//! Runtime error types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur during agent runtime execution.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// LLM provider error (streaming, auth, rate limit).
    #[error("Provider error: {0}")]
    Provider(#[from] tron_llm::provider::ProviderError),

    /// Tool execution error.
    #[error("Tool error: {tool_name}: {message}")]
    Tool {
        /// Tool name.
        tool_name: String,
        /// Error description.
        message: String,
    },

    /// Context management error (compaction, token limit).
    #[error("Context error: {0}")]
    Context(String),

    /// Operation was cancelled via abort/cancellation token.
    #[error("Operation cancelled")]
    Cancelled,

    /// Agent exceeded the maximum turn count.
    #[error("Max turns ({0}) exceeded")]
    MaxTurns(u32),

    /// Session not found.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Session is busy (another prompt is running).
    #[error("Session busy: {0}")]
    SessionBusy(String),

    /// Event persistence error.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal / unexpected error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Operation is invalid given the session's current state (plan mode, model).
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl RuntimeError {
    /// Whether the error is recoverable (user can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Cancelled | Self::MaxTurns(_) | Self::SessionBusy(_) => true,
            Self::Tool { .. }
            | Self::Context(_)
            | Self::SessionNotFound(_)
            | Self::Persistence(_)
            | Self::Internal(_)
            | Self::InvalidState(_) => false,
        }
    }

    /// Error category string for event emission.
    pub fn category(&self) -> &str {
        match self {
            Self::Provider(_) => "provider",
            Self::Tool { .. } => "tool",
            Self::Context(_) => "context",
            Self::Cancelled => "cancelled",
            Self::MaxTurns(_) => "max_turns",
            Self::SessionNotFound(_) => "session_not_found",
            Self::SessionBusy(_) => "session_busy",
            Self::Persistence(_) => "persistence",
            Self::Internal(_) => "internal",
            Self::InvalidState(_) => "invalid_state",
        }
    }
}

/// Reason the agent stopped running.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// LLM chose to stop (`end_turn`).
    EndTurn,
    /// Turn limit reached.
    MaxTurns,
    /// Tool requested stop (`AskUserQuestion`, `RenderAppUI`).
    ToolStop,
    /// Unrecoverable error.
    Error,
    /// User abort.
    Interrupted,
    /// Pure text response (no tools to execute).
    NoToolCalls,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndTurn => write!(f, "end_turn"),
            Self::MaxTurns => write!(f, "max_turns"),
            Self::ToolStop => write!(f, "tool_stop"),
            Self::Error => write!(f, "error"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::NoToolCalls => write!(f, "no_tool_calls"),
        }
    }
}
