//! Provider configuration types for all content providers.

pub mod calendar;
pub mod clock;
pub mod news;
pub mod of_the_day;
pub mod ticker;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export all provider config types for convenience
pub use calendar::CalendarProviderConfig;
pub use clock::{ClockProviderConfig, TimeFormat};
pub use news::NewsProviderConfig;
pub use of_the_day::{OfTheDayCategory, OfTheDayProviderConfig};
pub use ticker::TickerProviderConfig;

/// Where a network-backed provider gets its content from.
///
/// Fetching over the network is the job of an external collaborator; the
/// display either gets a fixed value from the config or reads the JSON file
/// that collaborator keeps up to date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSourceConfig<T> {
    /// Fixed content from the configuration file
    Static { value: T },
    /// JSON document re-read on every refresh
    JsonFile { path: PathBuf },
}

impl<T: Default> Default for ContentSourceConfig<T> {
    fn default() -> Self {
        ContentSourceConfig::Static {
            value: T::default(),
        }
    }
}

pub(crate) fn default_refresh_budget() -> u64 {
    10_000
}
