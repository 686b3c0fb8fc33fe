//! # tron-platform
//!
//! Platform integrations in scope for session execution: isolated, pure-Rust
//! git worktrees (via `gix`) for sessions that make filesystem changes
//! without touching the caller's checkout.

#![deny(unsafe_code)]

pub mod worktree;

pub use worktree::{WorktreeError, WorktreeHandle, WorktreeManager};
