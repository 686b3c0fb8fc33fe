//! Hook handler trait.
//!
//! Defines the [`HookHandler`] trait that all hook implementations must satisfy.
//! Handlers are registered with the [`HookRegistry`](super::registry::HookRegistry)
//! and executed by the [`HookEngine`](super::engine::HookEngine).

use async_trait::async_trait;

use super::errors::HookError;
use super::types::{HookContext, HookExecutionMode, HookResult, HookType};

/// A lifecycle hook handler.
///
/// Implementations are registered in the hook registry and executed at the
/// appropriate lifecycle point. Handlers can inspect the context and return
/// a [`HookResult`] indicating whether to continue, block, or modify the
/// operation.
///
/// # Priority
///
/// Higher priority handlers run first. Default priority is 0.
///
/// # Execution Mode
///
/// Handlers declare whether they should run in blocking or background mode.
/// Note that forced-blocking hook types (`PreToolUse`, `UserPromptSubmit`,
/// `PreCompact`) always run in blocking mode regardless of the declared mode.
///
/// # Filtering
///
/// Override [`should_handle`](HookHandler::should_handle) to conditionally
/// skip the handler for specific contexts.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Unique name for this handler.
    fn name(&self) -> &str;

    /// Which lifecycle event this handler responds to.
    fn hook_type(&self) -> HookType;

    /// Execution priority. Higher runs first. Default: 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Preferred execution mode. Default: Blocking.
    ///
    /// Note: forced-blocking hook types always run in blocking mode
    /// regardless of this setting.
    fn execution_mode(&self) -> HookExecutionMode {
        HookExecutionMode::Blocking
    }

    /// Optional human-readable description.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Optional timeout in milliseconds.
    fn timeout_ms(&self) -> Option<u64> {
        None
    }

    /// Execute the handler with the given context.
    ///
    /// Errors are caught by the engine and treated as `Continue` (fail-open).
    async fn handle(&self, context: &HookContext) -> Result<HookResult, HookError>;

    /// Optional filter. Return `false` to skip this handler for the context.
    ///
    /// Default returns `true` (always handle).
    fn should_handle(&self, _context: &HookContext) -> bool {
        true
    }
}
