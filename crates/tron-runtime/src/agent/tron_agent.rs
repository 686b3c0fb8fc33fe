//! `TronAgent` — multi-turn agent with turn loop, abort, and state tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tron_context::context_manager::ContextManager;
use crate::guardrails::GuardrailEngine;
use crate::hooks::engine::HookEngine;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tron_core::events::{BaseEvent, TronEvent};
use tron_core::messages::{Message, TokenUsage, UserMessageContent};
use tron_llm::provider::Provider;
use tron_tools::registry::ToolRegistry;

use tracing::{error, info, instrument, warn};

use crate::agent::compaction_handler::CompactionHandler;
use crate::agent::event_emitter::EventEmitter;
use crate::agent::turn_runner;
use crate::errors::StopReason;
use crate::orchestrator::event_persister::EventPersister;
use crate::types::{AgentConfig, RunContext, RunResult};

/// RAII guard that resets `is_running` to `false` on drop (even on panic).
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Multi-turn agent that owns all submodules.
pub struct TronAgent {
    config: AgentConfig,
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    guardrails: Option<Arc<parking_lot::Mutex<GuardrailEngine>>>,
    hooks: Option<Arc<HookEngine>>,
    context_manager: ContextManager,
    emitter: Arc<EventEmitter>,
    compaction: CompactionHandler,
    session_id: String,
    current_turn: AtomicU32,
    is_running: AtomicBool,
    abort_token: CancellationToken,
    /// Whether the abort token was provided externally (e.g. by orchestrator).
    external_abort_token: bool,
    /// Optional inline event persister (injected by orchestrator).
    persister: Option<Arc<EventPersister>>,
}

impl TronAgent {
    /// Create a new agent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AgentConfig,
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
        guardrails: Option<Arc<parking_lot::Mutex<GuardrailEngine>>>,
        hooks: Option<Arc<HookEngine>>,
        context_manager: ContextManager,
        session_id: String,
    ) -> Self {
        let compaction = CompactionHandler::new();
        Self {
            config,
            provider,
            registry,
            guardrails,
            hooks,
            context_manager,
            emitter: Arc::new(EventEmitter::new()),
            compaction,
            session_id,
            current_turn: AtomicU32::new(0),
            is_running: AtomicBool::new(false),
            abort_token: CancellationToken::new(),
            external_abort_token: false,
            persister: None,
        }
    }

    /// Run the multi-turn loop with user content.
    #[allow(clippy::too_many_lines)]
    #[instrument(skip(self, ctx), fields(session_id = %self.session_id, model = %self.config.model))]
    pub async fn run(&mut self, content: &str, mut ctx: RunContext) -> RunResult {
        // Reject concurrent runs — guard resets is_running on drop (even on panic)
        let Some(_guard) = RunGuard::new(&self.is_running) else {
            return RunResult {
                stop_reason: StopReason::Error,
                error: Some("Agent is already running".into()),
                ..Default::default()
            };
        };

        // Reset abort token for this run (unless an external token was injected)
        if !self.external_abort_token {
            self.abort_token = CancellationToken::new();
        }
        self.current_turn.store(0, Ordering::Relaxed);

        let mut total_usage = TokenUsage::default();
        let mut final_stop_reason = StopReason::EndTurn;
        let mut interrupted = false;
        let mut error: Option<String> = None;

        // Add user message to context
        let user_content = if let Some(override_content) = ctx.user_content_override.take() {
            override_content
        } else {
            UserMessageContent::Text(content.to_owned())
        };
        self.context_manager.add_message(Message::User {
            content: user_content,
            timestamp: None,
        });

        // Emit AgentStart
        let _ = self.emitter.emit(TronEvent::AgentStart {
            base: BaseEvent::now(&self.session_id),
        });
        info!(session_id = %self.session_id, "agent run started");

        let max_turns = self.config.max_turns;
        let mut turn = 0u32;
        let mut exited_via_break = false;
        let mut previous_context_baseline: u64 = 0;

        while turn < max_turns {
            turn += 1;
            self.current_turn.store(turn, Ordering::Relaxed);

            let result = turn_runner::execute_turn(
                turn,
                &mut self.context_manager,
                &self.provider,
                &self.registry,
                &self.guardrails,
                &self.hooks,
                &self.compaction,
                &self.session_id,
                &self.emitter,
                &self.abort_token,
                &ctx,
                self.persister.as_deref(),
                previous_context_baseline,
                self.config.subagent_depth,
                self.config.subagent_max_depth,
                self.config.retry.as_ref(),
                self.config.health_tracker.as_ref(),
            )
            .await;

            // Update baseline for next turn
            if let Some(cw) = result.context_window_tokens {
                previous_context_baseline = cw;
            }

            // Accumulate token usage
            if let Some(ref usage) = result.token_usage {
                total_usage.input_tokens += usage.input_tokens;
                total_usage.output_tokens += usage.output_tokens;
                if let Some(cache) = usage.cache_read_tokens {
                    *total_usage.cache_read_tokens.get_or_insert(0) += cache;
                }
                if let Some(cache) = usage.cache_creation_tokens {
                    *total_usage.cache_creation_tokens.get_or_insert(0) += cache;
                }
            }

            if !result.success {
                error!(session_id = %self.session_id, turn, error = ?result.error, "turn failed");
                final_stop_reason = StopReason::Error;
                error = result.error;
                exited_via_break = true;
                break;
            }

            if result.interrupted {
                warn!(session_id = %self.session_id, turn, "agent interrupted");
                final_stop_reason = StopReason::Interrupted;
                interrupted = true;
                exited_via_break = true;
                break;
            }

            if result.stop_turn_requested {
                final_stop_reason = StopReason::ToolStop;
                exited_via_break = true;
                break;
            }

            if let Some(StopReason::EndTurn | StopReason::NoToolCalls) = result.stop_reason {
                final_stop_reason = result.stop_reason.unwrap_or(StopReason::EndTurn);
                exited_via_break = true;
                break;
            }
            // Continue looping (tool calls executed, more turns needed)
        }

        // If the loop ended because turn >= max_turns (not via break),
        // the agent exhausted its turn budget.
        if !exited_via_break && turn >= max_turns {
            final_stop_reason = StopReason::MaxTurns;
        }

        info!(session_id = %self.session_id, turns = turn, stop_reason = ?final_stop_reason, "agent run completed");

        // Emit AgentEnd
        let _ = self.emitter.emit(TronEvent::AgentEnd {
            base: BaseEvent::now(&self.session_id),
            error: error.clone(),
        });

        // _guard drops here, resetting is_running (even on panic)

        RunResult {
            turns_executed: turn,
            total_token_usage: total_usage,
            stop_reason: final_stop_reason,
            interrupted,
            error,
            last_context_window_tokens: if previous_context_baseline > 0 {
                Some(previous_context_baseline)
            } else {
                None
            },
        }
    }

    /// Set an external abort token (e.g. from the orchestrator).
    /// When set, `run()` will not reset it — the orchestrator controls cancellation.
    pub fn set_abort_token(&mut self, token: CancellationToken) {
        self.abort_token = token;
        self.external_abort_token = true;
    }

    /// Set the inline event persister (e.g. from the orchestrator).
    pub fn set_persister(&mut self, persister: Option<Arc<EventPersister>>) {
        if let Some(ref p) = persister {
            self.compaction.set_persister(p.clone());
        }
        self.persister = persister;
    }

    /// Abort the current run.
    pub fn abort(&self) {
        self.abort_token.cancel();
    }

    /// Whether the agent is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Current turn number (0 if not running).
    pub fn current_turn(&self) -> u32 {
        self.current_turn.load(Ordering::Relaxed)
    }

    /// Subscribe to agent events.
    pub fn subscribe(&self) -> broadcast::Receiver<TronEvent> {
        self.emitter.subscribe()
    }

    /// Get the session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the current model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get a reference to the context manager.
    pub fn context_manager(&self) -> &ContextManager {
        &self.context_manager
    }

    /// Get a mutable reference to the context manager.
    pub fn context_manager_mut(&mut self) -> &mut ContextManager {
        &mut self.context_manager
    }

    /// Get the emitter.
    pub fn emitter(&self) -> &Arc<EventEmitter> {
        &self.emitter
    }
}

#[cfg(test)]
impl TronAgent {
    pub(crate) fn subagent_depth(&self) -> u32 {
        self.config.subagent_depth
    }

    pub(crate) fn subagent_max_depth(&self) -> u32 {
        self.config.subagent_max_depth
    }
}
