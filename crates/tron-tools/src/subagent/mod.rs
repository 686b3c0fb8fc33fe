//! Subagent orchestration tools: spawn, query, and wait for child sessions.

pub mod query;
pub mod spawn;
pub mod wait;
