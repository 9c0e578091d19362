//! led-ticker-core: Content provider trait, rotation scheduler and
//! background refresh for the led-ticker matrix display.
//!
//! This crate contains the provider capability set (ContentProvider), the
//! RotationScheduler that decides what is on screen, the single-slot
//! refresh cache providers read from, and the provider registry.

pub mod constants;
mod errors;
mod provider;
mod refresh;
mod registry;
mod scheduler;

pub use constants::{
    DEFAULT_DISPLAY_DURATION, DEFAULT_MAX_SINK_FAILURES, DEFAULT_REFRESH_BUDGET,
    DEFAULT_TICK_INTERVAL, LINE_GAP,
};
pub use errors::ProviderRefreshError;
pub use provider::{
    BoxedProvider, ContentProvider, PaintedKey, ProviderMetadata, RotationPhase, RotationState,
    TextPhase,
};
pub use refresh::{ContentFeed, ContentFetcher, ContentSlot, Snapshot};
pub use registry::{ProviderContext, ProviderFactory, ProviderInfo, ProviderRegistry};
pub use scheduler::{ProviderStatus, RotationScheduler, TickDecision};

// Re-export types used in trait signatures for convenience
pub use led_ticker_render::{Canvas, RenderError, TextLayoutEngine};
pub use led_ticker_types::{ProviderConfig, ProviderId};
