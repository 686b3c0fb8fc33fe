//! Hook registry.
//!
//! Maintains a priority-sorted collection of [`HookHandler`] instances per
//! [`HookType`]. The registry is the source of truth for which hooks are
//! active and what order they run in.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::handler::HookHandler;
use super::types::{HookInfo, HookType};

/// Registry of lifecycle hook handlers.
///
/// Handlers are organized by [`HookType`] and sorted by priority (descending)
/// within each type. Higher priority handlers run first.
#[derive(Default)]
pub struct HookRegistry {
    /// Handlers keyed by hook type, sorted by priority descending.
    hooks: HashMap<HookType, Vec<Arc<dyn HookHandler>>>,
}

impl HookRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Register a hook handler.
    ///
    /// The handler is inserted into the correct type bucket and the bucket
    /// is re-sorted by priority (descending). If a handler with the same
    /// name already exists for the same type, it is replaced.
    pub fn register(&mut self, handler: Arc<dyn HookHandler>) {
        let hook_type = handler.hook_type();
        let name = handler.name().to_string();

        let handlers = self.hooks.entry(hook_type).or_default();

        // Remove existing handler with same name
        handlers.retain(|h| h.name() != name);

        debug!(name = %name, hook_type = %hook_type, priority = handler.priority(), "Registering hook");
        handlers.push(handler);

        // Sort by priority descending (higher priority first)
        handlers.sort_by_key(|h| std::cmp::Reverse(h.priority()));
    }

    /// Unregister a handler by name.
    ///
    /// Searches all hook types. Returns `true` if a handler was found and
    /// removed, `false` otherwise.
    pub fn unregister(&mut self, name: &str) -> bool {
        let mut found = false;
        for handlers in self.hooks.values_mut() {
            let before_len = handlers.len();
            handlers.retain(|h| h.name() != name);
            if handlers.len() < before_len {
                found = true;
            }
        }
        if found {
            debug!(name = %name, "Unregistered hook");
        }
        found
    }

    /// Get handlers for a specific hook type, sorted by priority (descending).
    #[must_use]
    pub fn get_handlers(&self, hook_type: HookType) -> Vec<Arc<dyn HookHandler>> {
        self.hooks.get(&hook_type).cloned().unwrap_or_default()
    }

    /// List information about all registered hooks.
    #[must_use]
    pub fn list_all(&self) -> Vec<HookInfo> {
        let mut infos = Vec::new();
        for handlers in self.hooks.values() {
            for handler in handlers {
                infos.push(HookInfo {
                    name: handler.name().to_string(),
                    hook_type: handler.hook_type(),
                    priority: handler.priority(),
                    execution_mode: handler.execution_mode(),
                    description: handler.description().map(ToString::to_string),
                    timeout_ms: handler.timeout_ms(),
                });
            }
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Get a handler by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn HookHandler>> {
        for handlers in self.hooks.values() {
            for handler in handlers {
                if handler.name() == name {
                    return Some(Arc::clone(handler));
                }
            }
        }
        None
    }

    /// Get the total number of registered handlers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    /// Clear all registered handlers.
    pub fn clear(&mut self) {
        self.hooks.clear();
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hook_count", &self.count())
            .finish()
    }
}
