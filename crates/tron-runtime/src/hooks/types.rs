//! Core types for the hook system.
//!
//! Defines hook types, actions, results, execution modes, and context variants
//! for the lifecycle hook system. All context types use `camelCase` serde
//! renaming for wire compatibility with the TypeScript server and iOS client.

use serde::{Deserialize, Serialize};

/// Lifecycle hook type.
///
/// Hooks fire at specific points in the agent's execution lifecycle.
/// Some types are forced-blocking — they can affect agent flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookType {
    /// Before a tool is executed. Forced-blocking.
    PreToolUse,
    /// After a tool has executed.
    PostToolUse,
    /// When the agent stops.
    Stop,
    /// When a subagent stops.
    SubagentStop,
    /// When a session starts.
    SessionStart,
    /// When a session ends.
    SessionEnd,
    /// When a user submits a prompt. Forced-blocking.
    UserPromptSubmit,
    /// Before context compaction. Forced-blocking.
    PreCompact,
    /// Notification event.
    Notification,
}

impl HookType {
    /// Returns `true` if this hook type is always executed in blocking mode.
    ///
    /// Forced-blocking hooks can affect agent flow (block a tool call,
    /// modify a prompt, prevent compaction). Running them in the background
    /// would create race conditions.
    #[must_use]
    pub fn is_forced_blocking(self) -> bool {
        matches!(
            self,
            Self::PreToolUse | Self::UserPromptSubmit | Self::PreCompact
        )
    }

    /// Returns all hook type variants.
    #[must_use]
    pub fn all() -> &'static [HookType] {
        &[
            Self::PreToolUse,
            Self::PostToolUse,
            Self::Stop,
            Self::SubagentStop,
            Self::SessionStart,
            Self::SessionEnd,
            Self::UserPromptSubmit,
            Self::PreCompact,
            Self::Notification,
        ]
    }
}

impl std::fmt::Display for HookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreToolUse => write!(f, "PreToolUse"),
            Self::PostToolUse => write!(f, "PostToolUse"),
            Self::Stop => write!(f, "Stop"),
            Self::SubagentStop => write!(f, "SubagentStop"),
            Self::SessionStart => write!(f, "SessionStart"),
            Self::SessionEnd => write!(f, "SessionEnd"),
            Self::UserPromptSubmit => write!(f, "UserPromptSubmit"),
            Self::PreCompact => write!(f, "PreCompact"),
            Self::Notification => write!(f, "Notification"),
        }
    }
}

/// Action a hook handler can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookAction {
    /// Continue execution normally.
    Continue,
    /// Block the current operation.
    Block,
    /// Modify the operation with provided modifications.
    Modify,
}

/// How a hook executes relative to the agent flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookExecutionMode {
    /// Runs synchronously; agent waits for the result.
    #[default]
    Blocking,
    /// Runs in the background; agent continues immediately.
    Background,
}

/// Result returned by a hook handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookResult {
    /// Action to take.
    pub action: HookAction,
    /// Reason for the action (typically set for `Block`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Message to display or log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Modifications to apply (for `Modify` action).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifications: Option<serde_json::Value>,
}

impl HookResult {
    /// Create a `Continue` result (no action needed).
    #[must_use]
    pub fn continue_() -> Self {
        Self {
            action: HookAction::Continue,
            reason: None,
            message: None,
            modifications: None,
        }
    }

    /// Create a `Block` result with a reason.
    #[must_use]
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            action: HookAction::Block,
            reason: Some(reason.into()),
            message: None,
            modifications: None,
        }
    }

    /// Create a `Modify` result with modifications.
    #[must_use]
    pub fn modify(modifications: serde_json::Value) -> Self {
        Self {
            action: HookAction::Modify,
            reason: None,
            message: None,
            modifications: Some(modifications),
        }
    }

    /// Create a `Modify` result with modifications and a message.
    #[must_use]
    pub fn modify_with_message(modifications: serde_json::Value, message: impl Into<String>) -> Self {
        Self {
            action: HookAction::Modify,
            reason: None,
            message: Some(message.into()),
            modifications: Some(modifications),
        }
    }

    /// Whether this result blocks the operation.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.action == HookAction::Block
    }
}

/// Hook context — one variant per [`HookType`].
///
/// Passed to hook handlers so they can inspect and act on the current
/// lifecycle event. All variants include `session_id` and `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "hookType", rename_all = "camelCase")]
pub enum HookContext {
    /// Context for [`HookType::PreToolUse`].
    #[serde(rename_all = "camelCase")]
    PreToolUse {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Tool being invoked.
        tool_name: String,
        /// Arguments passed to the tool.
        tool_arguments: serde_json::Value,
        /// Unique ID for this tool call.
        tool_call_id: String,
    },
    /// Context for [`HookType::PostToolUse`].
    #[serde(rename_all = "camelCase")]
    PostToolUse {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Tool that was invoked.
        tool_name: String,
        /// Unique ID for this tool call.
        tool_call_id: String,
        /// Serialized tool result.
        result: serde_json::Value,
        /// How long the tool call took.
        duration_ms: u64,
    },
    /// Context for [`HookType::Stop`].
    #[serde(rename_all = "camelCase")]
    Stop {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Why the agent is stopping.
        stop_reason: String,
        /// Last message from the agent.
        final_message: Option<String>,
    },
    /// Context for [`HookType::SubagentStop`].
    #[serde(rename_all = "camelCase")]
    SubagentStop {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Subagent session ID.
        subagent_id: String,
        /// Why the subagent stopped.
        stop_reason: String,
        /// Result from the subagent.
        result: Option<serde_json::Value>,
    },
    /// Context for [`HookType::SessionStart`].
    #[serde(rename_all = "camelCase")]
    SessionStart {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Working directory for the session.
        working_directory: String,
        /// Parent session ID if this is a handoff.
        parent_handoff_id: Option<String>,
    },
    /// Context for [`HookType::SessionEnd`].
    #[serde(rename_all = "camelCase")]
    SessionEnd {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Number of messages in the session.
        message_count: u64,
        /// Number of tool calls in the session.
        tool_call_count: u64,
    },
    /// Context for [`HookType::UserPromptSubmit`].
    #[serde(rename_all = "camelCase")]
    UserPromptSubmit {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// The user's prompt text.
        prompt: String,
    },
    /// Context for [`HookType::PreCompact`].
    #[serde(rename_all = "camelCase")]
    PreCompact {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Current token usage.
        current_tokens: u64,
        /// Target token usage after compaction.
        target_tokens: u64,
    },
    /// Context for [`HookType::Notification`].
    #[serde(rename_all = "camelCase")]
    Notification {
        /// Session this hook fires in.
        session_id: String,
        /// ISO 8601 timestamp.
        timestamp: String,
        /// Notification severity level.
        level: String,
        /// Notification title.
        title: String,
        /// Optional notification body.
        body: Option<String>,
    },
}

impl HookContext {
    /// Get the [`HookType`] for this context.
    #[must_use]
    pub fn hook_type(&self) -> HookType {
        match self {
            Self::PreToolUse { .. } => HookType::PreToolUse,
            Self::PostToolUse { .. } => HookType::PostToolUse,
            Self::Stop { .. } => HookType::Stop,
            Self::SubagentStop { .. } => HookType::SubagentStop,
            Self::SessionStart { .. } => HookType::SessionStart,
            Self::SessionEnd { .. } => HookType::SessionEnd,
            Self::UserPromptSubmit { .. } => HookType::UserPromptSubmit,
            Self::PreCompact { .. } => HookType::PreCompact,
            Self::Notification { .. } => HookType::Notification,
        }
    }

    /// Get the session ID from any context variant.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::PreToolUse { session_id, .. }
            | Self::PostToolUse { session_id, .. }
            | Self::Stop { session_id, .. }
            | Self::SubagentStop { session_id, .. }
            | Self::SessionStart { session_id, .. }
            | Self::SessionEnd { session_id, .. }
            | Self::UserPromptSubmit { session_id, .. }
            | Self::PreCompact { session_id, .. }
            | Self::Notification { session_id, .. } => session_id,
        }
    }

    /// Get the timestamp from any context variant.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        match self {
            Self::PreToolUse { timestamp, .. }
            | Self::PostToolUse { timestamp, .. }
            | Self::Stop { timestamp, .. }
            | Self::SubagentStop { timestamp, .. }
            | Self::SessionStart { timestamp, .. }
            | Self::SessionEnd { timestamp, .. }
            | Self::UserPromptSubmit { timestamp, .. }
            | Self::PreCompact { timestamp, .. }
            | Self::Notification { timestamp, .. } => timestamp,
        }
    }
}

/// Information about a registered hook (for listing/inspection).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookInfo {
    /// Hook name.
    pub name: String,
    /// Hook type.
    pub hook_type: HookType,
    /// Execution priority (higher runs first).
    pub priority: i32,
    /// Execution mode.
    pub execution_mode: HookExecutionMode,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Where a discovered hook file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookSource {
    /// From project-level `.agent/hooks/` or `.tron/hooks/`.
    Project,
    /// From user-level `~/.config/tron/hooks/`.
    User,
    /// From a custom additional path.
    Custom,
}

impl std::fmt::Display for HookSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::User => write!(f, "user"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// A discovered hook file from filesystem scanning.
#[derive(Debug, Clone)]
pub struct DiscoveredHook {
    /// Hook name (e.g., `project:pre-tool-use`).
    pub name: String,
    /// Absolute path to the hook file.
    pub path: std::path::PathBuf,
    /// Inferred hook type from filename.
    pub hook_type: HookType,
    /// Whether the file is a shell script.
    pub is_shell_script: bool,
    /// Where the hook was found.
    pub source: HookSource,
    /// Priority extracted from filename prefix (e.g., `100-pre-tool-use`).
    pub priority: Option<i32>,
}

/// Configuration for hook discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Project root path for scanning `.agent/hooks/` and `.tron/hooks/`.
    pub project_path: Option<String>,
    /// User home directory override.
    pub user_home: Option<String>,
    /// Additional paths to scan for hooks.
    pub additional_paths: Vec<String>,
    /// Whether to include hooks from user-level directory.
    pub include_user_hooks: bool,
    /// File extensions to consider (e.g., `.sh`, `.ts`, `.js`).
    pub extensions: Vec<String>,
}
