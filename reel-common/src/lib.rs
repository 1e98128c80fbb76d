//! # Reel Generator Common Library
//!
//! Shared code for the reel generator crates:
//! - Configuration loading (TOML + environment)
//! - Progress event types
//! - SSE framing utilities
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
pub use events::ProgressEvent;
