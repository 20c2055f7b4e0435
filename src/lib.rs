//! termchat - AI chat in the terminal
//!
//! # Architecture
//!
//! - **providers**: one wire adapter per backend behind a shared
//!   build-request / extract-delta capability pair
//! - **streaming**: transport chunks → lines → ordered text deltas
//! - **render**: incremental markdown-aware styling with width wrapping
//! - **shell**: generated-command execution and the command-mode prompts
//! - **imagegen**: submit-then-poll image jobs, outside the delta pipeline

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod imagegen;
pub mod providers;
pub mod render;
pub mod session;
pub mod shell;
pub mod spinner;
pub mod streaming;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use errors::{ChatError, Result};
