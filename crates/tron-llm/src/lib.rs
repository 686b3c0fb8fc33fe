//! # tron-llm
//!
//! LLM provider trait and shared streaming utilities.
//!
//! Defines the `Provider` trait that all LLM backends implement:
//! - Shared SSE parser (handles Anthropic / `OpenAI` / Google format differences)
//! - Stream retry with exponential backoff + jitter
//! - Tool call JSON parsing from incremental deltas
//! - ID remapping utilities
//! - Model registry: `model_id -> ModelInfo { context_window, max_output, pricing, capabilities }`
//! - Provider factory: `create_provider(config) -> Box<dyn Provider>`

#![deny(unsafe_code)]

pub mod context_composition;
pub mod health;
pub mod id_remapping;
pub mod models;
pub mod provider;
pub mod retry;

pub use health::ProviderHealthTracker;
pub use models::{ModelInfo, ProviderType};
pub use provider::{Provider, ProviderError, ProviderResult, StreamEventStream};
pub use retry::{StreamFactory, StreamRetryConfig, with_provider_retry};
