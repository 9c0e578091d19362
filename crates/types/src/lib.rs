//! led-ticker-types: Shared data types for the led-ticker matrix display.
//!
//! This crate contains pure data types (colors, content payloads, provider
//! configs) shared across all led-ticker crates. It has no rendering or
//! runtime dependencies, making it suitable as a foundation layer.

pub mod color;
pub mod content;
pub mod provider;
pub mod source_configs;

// Re-export commonly used types at the crate root for convenience
pub use color::Rgb;
pub use content::{CalendarEvent, ContentItem, EventStart, Quote, QuoteKind};
pub use provider::{ProviderConfig, ProviderEntry, ProviderId};
pub use source_configs::{
    CalendarProviderConfig, ClockProviderConfig, ContentSourceConfig, NewsProviderConfig,
    OfTheDayCategory, OfTheDayProviderConfig, TickerProviderConfig, TimeFormat,
};
