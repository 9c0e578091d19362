//! Provider identity and the type-safe provider configuration enum.

use crate::source_configs::{
    CalendarProviderConfig, ClockProviderConfig, NewsProviderConfig, OfTheDayProviderConfig,
    TickerProviderConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Identity of a registered provider within one rotation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for providers registered without one
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Type-safe enum for all provider configurations.
/// Uses serde tag for JSON serialization: {"provider_type": "clock", ...}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "provider_type")]
pub enum ProviderConfig {
    #[serde(rename = "clock")]
    Clock(ClockProviderConfig),

    #[serde(rename = "ticker")]
    Ticker(TickerProviderConfig),

    #[serde(rename = "news")]
    News(NewsProviderConfig),

    #[serde(rename = "calendar")]
    Calendar(CalendarProviderConfig),

    #[serde(rename = "of_the_day")]
    OfTheDay(OfTheDayProviderConfig),
}

impl ProviderConfig {
    /// Get the provider type ID string
    pub fn provider_type(&self) -> &'static str {
        match self {
            ProviderConfig::Clock(_) => "clock",
            ProviderConfig::Ticker(_) => "ticker",
            ProviderConfig::News(_) => "news",
            ProviderConfig::Calendar(_) => "calendar",
            ProviderConfig::OfTheDay(_) => "of_the_day",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_display_duration() -> u64 {
    15
}

/// One provider in the rotation, as listed in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderEntry {
    /// Stable id; generated when absent
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How long the provider stays on screen per turn
    #[serde(default = "default_display_duration")]
    pub display_duration_secs: u64,
    #[serde(flatten)]
    pub config: ProviderConfig,
}

impl ProviderEntry {
    pub fn new(config: ProviderConfig, display_duration_secs: u64) -> Self {
        Self {
            id: Some(config.provider_type().to_string()),
            enabled: true,
            display_duration_secs,
            config,
        }
    }

    pub fn provider_id(&self) -> ProviderId {
        self.id
            .as_deref()
            .map(ProviderId::new)
            .unwrap_or_else(ProviderId::generate)
    }

    pub fn display_duration(&self) -> Duration {
        Duration::from_secs(self.display_duration_secs)
    }
}
