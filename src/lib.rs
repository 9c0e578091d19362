//! led-ticker: rotating informational content on a fixed-resolution LED
//! matrix
//!
//! This library provides:
//! - The display orchestrator tick loop and its control handle
//! - Application configuration
//! - Helpers that build a running rotation from a configuration file
//!
//! Fonts, layout and the canvas live in `led-ticker-render`, the provider
//! trait and scheduler in `led-ticker-core`, and the providers themselves in
//! `led-ticker-sources`.

pub mod app;
pub mod config;
pub mod core;

// Re-export commonly used types
pub use config::AppConfig;
pub use core::{DisplayOrchestrator, OrchestratorConfig, OrchestratorError, OrchestratorHandle};
